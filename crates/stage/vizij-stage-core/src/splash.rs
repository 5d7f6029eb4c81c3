//! Loading sequence shown on the splash screen.
//!
//! A single timeline: the bar fills in legs, then the label squeezes and
//! warps out. Progress is reported as the bar's rounded width percent.

use log::{debug, warn};

use crate::config::SplashConfig;
use crate::driver::{Driver, Timeline, TweenEvent};
use crate::ids::ElementId;
use crate::surface::{ElementKind, Prop, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplashEvent {
    Progress(u32),
    Finished,
}

#[derive(Debug)]
pub struct Splash {
    label: ElementId,
    bar: ElementId,
    timeline: Timeline,
    steps: usize,
    percent: u32,
    done: bool,
}

impl Splash {
    pub fn mount(root: ElementId, cfg: &SplashConfig, driver: &mut Driver, surface: &mut Surface) -> Self {
        let label = surface.create(ElementKind::SplashLabel, Some(root));
        let bar = surface.create(ElementKind::SplashBar, Some(root));
        driver.set(surface, bar, &[(Prop::Width, 0.0)]);

        let mut timeline = Timeline::new();
        for step in &cfg.steps {
            timeline = timeline.then(bar, &[(Prop::Width, step.percent)], step.motion.opts());
        }
        timeline = timeline
            .then(label, &[(Prop::Scale, cfg.squeeze_scale)], cfg.squeeze.opts())
            .then(
                label,
                &[(Prop::Scale, cfg.warp_scale), (Prop::Opacity, 0.0)],
                cfg.warp.opts(),
            );
        timeline.start(driver, surface);

        Self {
            label,
            bar,
            timeline,
            steps: cfg.steps.len() + 2,
            percent: 0,
            done: false,
        }
    }

    pub fn tick(&mut self, events: &[TweenEvent], driver: &mut Driver, surface: &Surface) -> Vec<SplashEvent> {
        let mut out = Vec::new();
        if self.done {
            return out;
        }
        self.timeline.advance(events, driver, surface);

        let percent = surface.prop(self.bar, Prop::Width).round().clamp(0.0, 100.0) as u32;
        if percent != self.percent {
            self.percent = percent;
            out.push(SplashEvent::Progress(percent));
        }

        if self.timeline.is_finished() {
            self.done = true;
            if self.timeline.completed_steps() == self.steps {
                debug!("splash sequence finished");
                out.push(SplashEvent::Finished);
            } else {
                warn!(
                    "splash sequence stopped after {}/{} steps",
                    self.timeline.completed_steps(),
                    self.steps
                );
            }
        }
        out
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn label(&self) -> ElementId {
        self.label
    }

    pub fn bar(&self) -> ElementId {
        self.bar
    }

    pub fn unmount(mut self, driver: &mut Driver, surface: &mut Surface) {
        self.timeline.kill(driver);
        driver.kill_tweens_of(self.label);
        driver.kill_tweens_of(self.bar);
        surface.remove(self.label);
        surface.remove(self.bar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Viewport;

    fn run(splash: &mut Splash, driver: &mut Driver, surface: &mut Surface, secs: f32) -> Vec<SplashEvent> {
        let dt = 1.0 / 60.0;
        let mut all = Vec::new();
        let mut t = 0.0;
        while t < secs {
            let ev = driver.tick(surface, dt);
            all.extend(splash.tick(&ev, driver, surface));
            t += dt;
        }
        all
    }

    #[test]
    fn progress_climbs_to_full_then_finishes() {
        let mut surface = Surface::new(Viewport::new(800.0, 600.0));
        let mut driver = Driver::new();
        let root = surface.create(ElementKind::ScreenRoot { screen: crate::transition::Screen::Splash }, None);
        let mut splash = Splash::mount(root, &SplashConfig::default(), &mut driver, &mut surface);

        let early = run(&mut splash, &mut driver, &mut surface, 0.85);
        assert!(early.contains(&SplashEvent::Progress(50)));
        assert!(!early.contains(&SplashEvent::Finished));

        let rest = run(&mut splash, &mut driver, &mut surface, 2.5);
        assert!(rest.contains(&SplashEvent::Progress(100)));
        assert_eq!(rest.last(), Some(&SplashEvent::Finished));
        assert_eq!(surface.prop(splash.label(), Prop::Opacity), 0.0);
        assert_eq!(surface.prop(splash.label(), Prop::Scale), 20.0);

        let mut percents = early
            .iter()
            .chain(rest.iter())
            .filter_map(|e| match e {
                SplashEvent::Progress(p) => Some(*p),
                SplashEvent::Finished => None,
            })
            .collect::<Vec<_>>();
        let sorted = {
            let mut s = percents.clone();
            s.sort_unstable();
            s
        };
        assert_eq!(percents, sorted);
        percents.dedup();
        assert_eq!(percents.last(), Some(&100));
    }

    #[test]
    fn killed_tween_stops_without_finishing() {
        let mut surface = Surface::new(Viewport::new(800.0, 600.0));
        let mut driver = Driver::new();
        let root = surface.create(ElementKind::ScreenRoot { screen: crate::transition::Screen::Splash }, None);
        let mut splash = Splash::mount(root, &SplashConfig::default(), &mut driver, &mut surface);
        driver.kill_tweens_of(splash.bar());
        let ev = run(&mut splash, &mut driver, &mut surface, 0.1);
        assert!(!ev.contains(&SplashEvent::Finished));
        assert!(splash.is_done());
    }

    #[test]
    fn unmount_removes_elements() {
        let mut surface = Surface::new(Viewport::new(800.0, 600.0));
        let mut driver = Driver::new();
        let root = surface.create(ElementKind::ScreenRoot { screen: crate::transition::Screen::Splash }, None);
        let splash = Splash::mount(root, &SplashConfig::default(), &mut driver, &mut surface);
        splash.unmount(&mut driver, &mut surface);
        assert_eq!(surface.count(&ElementKind::SplashBar), 0);
        assert_eq!(surface.count(&ElementKind::SplashLabel), 0);
        assert_eq!(driver.active_count(), 0);
    }
}
