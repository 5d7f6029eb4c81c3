//! Animation driver: property tweens over the presentation surface.
//!
//! Methods:
//! - `set` (instant), `to`, `from_to` (tweens), `kill`, `kill_tweens_of`
//! - `tick(dt)` advances every live tween and reports `Updated`/`Completed`
//!   events in place of completion callbacks; consumers match on the ids they
//!   started.
//!
//! A tween whose target element disappears, or whose last property is taken
//! over by a newer overwriting tween, reports `Interrupted` instead of
//! `Completed`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::ids::{ElementId, IdAllocator, TweenId};
use crate::surface::{Prop, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum Repeat {
    /// Number of extra cycles after the first.
    Count(u32),
    #[default]
    Never,
    Infinite,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenOpts {
    /// Seconds per cycle.
    pub duration: f32,
    pub ease: Ease,
    /// Seconds before the first cycle; start values are captured when it ends.
    pub delay: f32,
    pub repeat: Repeat,
    /// Alternate direction on every repeat.
    pub yoyo: bool,
    /// Take over the same properties from older tweens on the same target.
    pub overwrite: bool,
}

impl Default for TweenOpts {
    fn default() -> Self {
        Self {
            duration: 0.5,
            ease: Ease::Power1Out,
            delay: 0.0,
            repeat: Repeat::Never,
            yoyo: false,
            overwrite: true,
        }
    }
}

impl TweenOpts {
    pub fn new(duration: f32, ease: Ease) -> Self {
        Self {
            duration,
            ease,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Run alongside existing tweens on the same properties instead of replacing them.
    pub fn keep_existing(mut self) -> Self {
        self.overwrite = false;
        self
    }

    fn cycles(&self) -> Option<u64> {
        match self.repeat {
            Repeat::Never => Some(1),
            Repeat::Count(n) => Some(u64::from(n) + 1),
            Repeat::Infinite => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweenEvent {
    Updated(TweenId),
    Completed(TweenId),
    Interrupted(TweenId),
}

#[derive(Clone, Copy, Debug)]
struct Channel {
    prop: Prop,
    from: f32,
    to: f32,
}

#[derive(Debug)]
struct Tween {
    id: TweenId,
    target: ElementId,
    channels: Vec<Channel>,
    opts: TweenOpts,
    delay_left: f32,
    elapsed: f32,
    started: bool,
}

impl Tween {
    /// Eased progress for the current elapsed time and whether the tween is done.
    fn sample(&mut self) -> (f32, bool) {
        let d = self.opts.duration;
        let cycles = self.opts.cycles();
        if d <= 0.0 {
            return (self.end_progress(cycles.unwrap_or(1)), true);
        }
        if cycles.is_none() {
            // Fold elapsed into two cycles; parity is all yoyo needs.
            let period = 2.0 * d;
            if self.elapsed >= period {
                self.elapsed -= period * (self.elapsed / period).floor();
            }
        }
        let cycle = (self.elapsed / d).floor() as u64;
        if let Some(total) = cycles {
            if cycle >= total {
                return (self.end_progress(total), true);
            }
        }
        let local = ((self.elapsed - cycle as f32 * d) / d).clamp(0.0, 1.0);
        let forward = !(self.opts.yoyo && cycle % 2 == 1);
        let p = if forward { local } else { 1.0 - local };
        (self.opts.ease.apply(p), false)
    }

    fn end_progress(&self, cycles: u64) -> f32 {
        if self.opts.yoyo && cycles % 2 == 0 {
            0.0
        } else {
            1.0
        }
    }
}

/// Linear interpolation that lands exactly on `b` at the end of a tween.
#[inline]
fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    if t >= 1.0 {
        b
    } else {
        a + (b - a) * t
    }
}

#[derive(Debug, Default)]
pub struct Driver {
    ids: IdAllocator,
    tweens: Vec<Tween>,
    interrupted: Vec<TweenId>,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write properties immediately without animating.
    pub fn set(&mut self, surface: &mut Surface, target: ElementId, props: &[(Prop, f32)]) {
        for (prop, value) in props {
            surface.set(target, *prop, *value);
        }
    }

    /// Tween from the values current at start time to `props`.
    pub fn to(
        &mut self,
        surface: &Surface,
        target: ElementId,
        props: &[(Prop, f32)],
        opts: TweenOpts,
    ) -> TweenId {
        let channels = props
            .iter()
            .map(|(prop, to)| Channel {
                prop: *prop,
                from: surface.prop(target, *prop),
                to: *to,
            })
            .collect();
        self.spawn(target, channels, opts, false)
    }

    /// Tween from `from` to `to`; `from` is rendered immediately.
    pub fn from_to(
        &mut self,
        surface: &mut Surface,
        target: ElementId,
        from: &[(Prop, f32)],
        to: &[(Prop, f32)],
        opts: TweenOpts,
    ) -> TweenId {
        let channels: Vec<Channel> = to
            .iter()
            .map(|(prop, end)| Channel {
                prop: *prop,
                from: from
                    .iter()
                    .find(|(p, _)| p == prop)
                    .map(|(_, v)| *v)
                    .unwrap_or_else(|| surface.prop(target, *prop)),
                to: *end,
            })
            .collect();
        let id = self.spawn(target, channels, opts, true);
        self.set(surface, target, from);
        id
    }

    fn spawn(
        &mut self,
        target: ElementId,
        channels: Vec<Channel>,
        opts: TweenOpts,
        started: bool,
    ) -> TweenId {
        if opts.overwrite {
            let props: Vec<Prop> = channels.iter().map(|c| c.prop).collect();
            let interrupted = &mut self.interrupted;
            self.tweens.retain_mut(|t| {
                if t.target != target {
                    return true;
                }
                t.channels.retain(|c| !props.contains(&c.prop));
                if t.channels.is_empty() {
                    interrupted.push(t.id);
                    return false;
                }
                true
            });
        }
        let id = self.ids.alloc_tween();
        // Tweens with a delay capture their start values when the delay ends.
        let started = started || opts.delay <= 0.0;
        self.tweens.push(Tween {
            id,
            target,
            channels,
            opts,
            delay_left: opts.delay.max(0.0),
            elapsed: 0.0,
            started,
        });
        id
    }

    /// Stop a tween where it is. Returns false if it had already finished.
    pub fn kill(&mut self, id: TweenId) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.id != id);
        before != self.tweens.len()
    }

    pub fn kill_tweens_of(&mut self, target: ElementId) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.target != target);
        before - self.tweens.len()
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.tweens.iter().any(|t| t.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn tweens_of(&self, target: ElementId) -> usize {
        self.tweens.iter().filter(|t| t.target == target).count()
    }

    /// Advance all tweens by `dt` seconds and write their values to the surface.
    pub fn tick(&mut self, surface: &mut Surface, dt: f32) -> Vec<TweenEvent> {
        let mut events: Vec<TweenEvent> = self
            .interrupted
            .drain(..)
            .map(TweenEvent::Interrupted)
            .collect();
        let dt = dt.max(0.0);
        let mut finished: Vec<TweenId> = Vec::new();

        for tween in &mut self.tweens {
            if !surface.contains(tween.target) {
                events.push(TweenEvent::Interrupted(tween.id));
                finished.push(tween.id);
                continue;
            }

            let mut step = dt;
            if tween.delay_left > 0.0 {
                if step < tween.delay_left {
                    tween.delay_left -= step;
                    continue;
                }
                step -= tween.delay_left;
                tween.delay_left = 0.0;
            }
            if !tween.started {
                for ch in &mut tween.channels {
                    ch.from = surface.prop(tween.target, ch.prop);
                }
                tween.started = true;
            }

            tween.elapsed += step;
            let (progress, done) = tween.sample();
            for ch in &tween.channels {
                surface.set(tween.target, ch.prop, lerp_f32(ch.from, ch.to, progress));
            }
            events.push(TweenEvent::Updated(tween.id));
            if done {
                events.push(TweenEvent::Completed(tween.id));
                finished.push(tween.id);
            }
        }

        if !finished.is_empty() {
            self.tweens.retain(|t| !finished.contains(&t.id));
        }
        events
    }
}

/// One step of a [`Timeline`].
#[derive(Clone, Debug)]
pub struct TimelineStep {
    pub target: ElementId,
    pub props: Vec<(Prop, f32)>,
    pub opts: TweenOpts,
}

/// Sequential chain of `to` tweens; each step starts when the previous one completes.
#[derive(Debug, Default)]
pub struct Timeline {
    steps: VecDeque<TimelineStep>,
    current: Option<TweenId>,
    completed_steps: usize,
    finished: bool,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, target: ElementId, props: &[(Prop, f32)], opts: TweenOpts) -> Self {
        self.steps.push_back(TimelineStep {
            target,
            props: props.to_vec(),
            opts,
        });
        self
    }

    pub fn start(&mut self, driver: &mut Driver, surface: &Surface) {
        if self.current.is_none() && !self.finished {
            self.launch_next(driver, surface);
        }
    }

    fn launch_next(&mut self, driver: &mut Driver, surface: &Surface) {
        match self.steps.pop_front() {
            Some(step) => {
                self.current = Some(driver.to(surface, step.target, &step.props, step.opts));
            }
            None => {
                self.current = None;
                self.finished = true;
            }
        }
    }

    /// Feed one tick's driver events. Returns true when a step boundary was crossed.
    pub fn advance(&mut self, events: &[TweenEvent], driver: &mut Driver, surface: &Surface) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        if events.contains(&TweenEvent::Completed(current)) {
            self.completed_steps += 1;
            self.launch_next(driver, surface);
            true
        } else if events.contains(&TweenEvent::Interrupted(current)) || !driver.is_active(current) {
            self.steps.clear();
            self.current = None;
            self.finished = true;
            true
        } else {
            false
        }
    }

    pub fn kill(&mut self, driver: &mut Driver) {
        if let Some(current) = self.current.take() {
            driver.kill(current);
        }
        self.steps.clear();
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn completed_steps(&self) -> usize {
        self.completed_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{ElementKind, Viewport};

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn surface_with_el() -> (Surface, ElementId) {
        let mut s = Surface::new(Viewport::new(1000.0, 800.0));
        let el = s.create(ElementKind::Bubble, None);
        (s, el)
    }

    #[test]
    fn to_interpolates_and_completes_once() {
        let (mut s, el) = surface_with_el();
        let mut d = Driver::new();
        let id = d.to(&s, el, &[(Prop::X, 100.0)], TweenOpts::new(1.0, Ease::Linear));

        let ev = d.tick(&mut s, 0.5);
        assert_eq!(ev, vec![TweenEvent::Updated(id)]);
        approx(s.prop(el, Prop::X), 50.0, 1e-4);

        let ev = d.tick(&mut s, 0.6);
        assert!(ev.contains(&TweenEvent::Completed(id)));
        approx(s.prop(el, Prop::X), 100.0, 1e-6);
        assert!(!d.is_active(id));
        assert!(d.tick(&mut s, 0.1).is_empty());
    }

    #[test]
    fn delayed_tween_captures_start_value_after_delay() {
        let (mut s, el) = surface_with_el();
        let mut d = Driver::new();
        let id = d.to(
            &s,
            el,
            &[(Prop::Y, 10.0)],
            TweenOpts::new(1.0, Ease::Linear)
                .with_delay(0.5)
                .keep_existing(),
        );
        s.set(el, Prop::Y, 4.0);
        assert!(d.tick(&mut s, 0.25).is_empty());
        d.tick(&mut s, 0.25);
        d.tick(&mut s, 0.5);
        approx(s.prop(el, Prop::Y), 7.0, 1e-4);
        assert!(d.is_active(id));
    }

    #[test]
    fn infinite_yoyo_oscillates_between_endpoints() {
        let (mut s, el) = surface_with_el();
        let mut d = Driver::new();
        let id = d.to(
            &s,
            el,
            &[(Prop::Y, 10.0)],
            TweenOpts::new(1.0, Ease::Linear)
                .with_repeat(Repeat::Infinite)
                .with_yoyo(true),
        );
        d.tick(&mut s, 1.5);
        approx(s.prop(el, Prop::Y), 5.0, 1e-4);
        d.tick(&mut s, 0.5);
        approx(s.prop(el, Prop::Y), 0.0, 1e-4);
        for _ in 0..1000 {
            d.tick(&mut s, 0.25);
        }
        assert!(d.is_active(id));
        let y = s.prop(el, Prop::Y);
        assert!((0.0..=10.0).contains(&y));
    }

    #[test]
    fn finite_yoyo_with_odd_repeat_returns_home() {
        let (mut s, el) = surface_with_el();
        let mut d = Driver::new();
        let id = d.to(
            &s,
            el,
            &[(Prop::Scale, 3.0)],
            TweenOpts::new(0.5, Ease::Linear)
                .with_repeat(Repeat::Count(1))
                .with_yoyo(true),
        );
        let ev = d.tick(&mut s, 2.0);
        assert!(ev.contains(&TweenEvent::Completed(id)));
        approx(s.prop(el, Prop::Scale), 1.0, 1e-6);
    }

    #[test]
    fn overwrite_takes_over_properties_and_interrupts_empty_tweens() {
        let (mut s, el) = surface_with_el();
        let mut d = Driver::new();
        let first = d.to(&s, el, &[(Prop::X, 100.0)], TweenOpts::new(1.0, Ease::Linear));
        let keep = d.to(
            &s,
            el,
            &[(Prop::Y, 5.0)],
            TweenOpts::new(1.0, Ease::Linear).keep_existing(),
        );
        let second = d.to(&s, el, &[(Prop::X, -100.0)], TweenOpts::new(1.0, Ease::Linear));
        assert!(!d.is_active(first));
        assert!(d.is_active(keep));
        let ev = d.tick(&mut s, 0.1);
        assert!(ev.contains(&TweenEvent::Interrupted(first)));
        assert!(ev.contains(&TweenEvent::Updated(second)));
    }

    #[test]
    fn removed_target_interrupts() {
        let (mut s, el) = surface_with_el();
        let mut d = Driver::new();
        let id = d.to(&s, el, &[(Prop::X, 1.0)], TweenOpts::new(1.0, Ease::Linear));
        s.remove(el);
        assert_eq!(d.tick(&mut s, 0.1), vec![TweenEvent::Interrupted(id)]);
        assert_eq!(d.active_count(), 0);
    }

    #[test]
    fn from_to_renders_from_immediately() {
        let (mut s, el) = surface_with_el();
        let mut d = Driver::new();
        d.from_to(
            &mut s,
            el,
            &[(Prop::YPercent, 10.0), (Prop::Opacity, 0.0)],
            &[(Prop::YPercent, 0.0), (Prop::Opacity, 1.0)],
            TweenOpts::new(0.6, Ease::Power3Out),
        );
        assert_eq!(s.prop(el, Prop::Opacity), 0.0);
        assert_eq!(s.prop(el, Prop::YPercent), 10.0);
        d.tick(&mut s, 0.6);
        approx(s.prop(el, Prop::Opacity), 1.0, 1e-6);
    }

    #[test]
    fn timeline_runs_steps_in_order() {
        let (mut s, el) = surface_with_el();
        let mut d = Driver::new();
        let mut tl = Timeline::new()
            .then(el, &[(Prop::Width, 50.0)], TweenOpts::new(0.5, Ease::Linear))
            .then(el, &[(Prop::Width, 100.0)], TweenOpts::new(0.5, Ease::Linear));
        tl.start(&mut d, &s);
        let mut guard = 0;
        while !tl.is_finished() && guard < 100 {
            let ev = d.tick(&mut s, 0.1);
            tl.advance(&ev, &mut d, &s);
            guard += 1;
        }
        assert!(tl.is_finished());
        assert_eq!(tl.completed_steps(), 2);
        approx(s.prop(el, Prop::Width), 100.0, 1e-6);
    }
}
