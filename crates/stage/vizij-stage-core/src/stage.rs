//! Top-level engine: screens, transitions, carousel and splash on one surface.

use log::{debug, info};

use crate::carousel::{Carousel, CarouselEvent, ClickOutcome};
use crate::config::{CarouselConfig, Config, SplashConfig};
use crate::content::{parse_deck_json, CarouselItem};
use crate::driver::Driver;
use crate::error::StageError;
use crate::ids::ElementId;
use crate::inputs::{InputEvent, Inputs};
use crate::outputs::{Outputs, StageEvent};
use crate::splash::{Splash, SplashEvent};
use crate::surface::{ElementKind, Surface, Viewport};
use crate::transition::{
    Method, Navigation, Screen, ScreenHost, TransitionEngine, TransitionEvent,
};

/// Mounted content of the active screen. Only one screen is mounted at a time.
#[derive(Debug)]
struct Screens {
    carousel_cfg: CarouselConfig,
    splash_cfg: SplashConfig,
    items: Vec<CarouselItem>,
    root: Option<ElementId>,
    carousel: Option<Carousel>,
    splash: Option<Splash>,
}

impl Screens {
    fn mount(&mut self, screen: Screen, driver: &mut Driver, surface: &mut Surface) -> ElementId {
        let root = surface.create(ElementKind::ScreenRoot { screen }, None);
        match screen {
            Screen::Splash => {
                self.splash = Some(Splash::mount(root, &self.splash_cfg, driver, surface));
            }
            Screen::Chapters => {
                self.carousel = Some(Carousel::mount(
                    Some(root),
                    self.items.clone(),
                    &self.carousel_cfg,
                    driver,
                    surface,
                ));
            }
            Screen::Home | Screen::Detail => {}
        }
        self.root = Some(root);
        root
    }

    fn unmount(&mut self, driver: &mut Driver, surface: &mut Surface) {
        if let Some(carousel) = self.carousel.take() {
            carousel.unmount(driver, surface);
        }
        if let Some(splash) = self.splash.take() {
            splash.unmount(driver, surface);
        }
        if let Some(root) = self.root.take() {
            driver.kill_tweens_of(root);
            surface.remove(root);
        }
    }
}

impl ScreenHost for Screens {
    fn swap_screen(
        &mut self,
        from: Screen,
        to: Screen,
        driver: &mut Driver,
        surface: &mut Surface,
    ) -> Option<ElementId> {
        debug!("swap screen {from} -> {to}");
        self.unmount(driver, surface);
        Some(self.mount(to, driver, surface))
    }
}

#[derive(Debug)]
pub struct Stage {
    cfg: Config,
    clock: f32,
    driver: Driver,
    surface: Surface,
    transition: TransitionEngine,
    screens: Screens,
    fallback_timer: f32,
    fallback_fired: bool,
    pending: Vec<StageEvent>,
    outputs: Outputs,
}

impl Stage {
    /// Build a stage showing the splash screen.
    pub fn new(cfg: Config, viewport: Viewport, items: Vec<CarouselItem>) -> Self {
        let mut driver = Driver::new();
        let mut surface = Surface::with_transition_layer(viewport);
        let mut screens = Screens {
            carousel_cfg: cfg.carousel.clone(),
            splash_cfg: cfg.splash.clone(),
            items,
            root: None,
            carousel: None,
            splash: None,
        };
        screens.mount(Screen::Splash, &mut driver, &mut surface);
        info!(
            "stage created: {}x{} viewport, {} cards",
            viewport.width,
            viewport.height,
            screens.items.len()
        );
        Self {
            transition: TransitionEngine::new(cfg.transition.clone(), Screen::Splash),
            cfg,
            clock: 0.0,
            driver,
            surface,
            screens,
            fallback_timer: 0.0,
            fallback_fired: false,
            pending: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    /// Build from JSON config and deck documents.
    pub fn from_json(config: &str, deck: &str, viewport: Viewport) -> Result<Self, StageError> {
        let cfg = Config::from_json(config)?;
        let items = parse_deck_json(deck)?;
        Ok(Self::new(cfg, viewport, items))
    }

    /// Request a screen change. Dropped while another transition runs.
    pub fn navigate(&mut self, target: Screen, method: Method) -> Navigation {
        let nav = self.transition.navigate(
            target,
            method,
            &mut self.driver,
            &mut self.surface,
            &mut self.screens,
        );
        if nav.is_dropped() {
            self.pending
                .push(StageEvent::NavigationDropped { target, method });
        }
        self.collect_transition_events();
        nav
    }

    /// Apply this frame's inputs, advance every animation by `dt` seconds and
    /// return the resulting surface deltas and events.
    pub fn update(&mut self, dt: f32, inputs: &Inputs) -> &Outputs {
        self.outputs.clear();
        let dt = dt.max(0.0);
        self.clock += dt;

        for event in &inputs.events {
            self.apply_input(event);
        }

        let events = self.driver.tick(&mut self.surface, dt);
        self.transition.tick(
            dt,
            &events,
            &mut self.driver,
            &mut self.surface,
            &mut self.screens,
        );
        self.collect_transition_events();

        if let Some(carousel) = self.screens.carousel.as_mut() {
            carousel.tick(dt, &events, &mut self.driver, &mut self.surface);
            for e in carousel.drain_events() {
                self.pending.push(match e {
                    CarouselEvent::CenteredIndexChanged { index } => {
                        StageEvent::CenteredIndexChanged { index }
                    }
                    CarouselEvent::PinChanged { pinned } => StageEvent::PinChanged { pinned },
                });
            }
        }

        let mut splash_finished = false;
        if let Some(splash) = self.screens.splash.as_mut() {
            for e in splash.tick(&events, &mut self.driver, &self.surface) {
                match e {
                    SplashEvent::Progress(percent) => {
                        self.pending.push(StageEvent::SplashProgress { percent })
                    }
                    SplashEvent::Finished => splash_finished = true,
                }
            }
        }
        if splash_finished {
            let _ = self.navigate(Screen::Home, Method::Bubble);
        }

        if !self.fallback_fired {
            self.fallback_timer += dt;
            if self.fallback_timer >= self.cfg.splash.fallback_secs {
                self.fallback_fired = true;
                if self.transition.screen() == Screen::Splash {
                    info!("splash fallback after {:.1}s", self.fallback_timer);
                    let _ = self.navigate(Screen::Home, Method::Bubble);
                }
            }
        }

        self.outputs.changes = self.surface.drain_changes();
        self.outputs.events.append(&mut self.pending);
        &self.outputs
    }

    fn apply_input(&mut self, event: &InputEvent) {
        let now = self.clock;
        match *event {
            InputEvent::Resize { width, height } => {
                self.surface
                    .set_viewport(Viewport::new(width.max(0.0), height.max(0.0)));
                if let Some(c) = self.screens.carousel.as_mut() {
                    c.resize(&mut self.driver, &mut self.surface);
                }
            }
            InputEvent::Scroll { y } => {
                if let Some(c) = self.screens.carousel.as_mut() {
                    c.on_scroll(y);
                }
            }
            InputEvent::PointerDown { x, .. } => {
                if let Some(c) = self.screens.carousel.as_mut() {
                    c.pointer_down(x, now, &mut self.driver);
                }
            }
            InputEvent::PointerMove { x, .. } => {
                if let Some(c) = self.screens.carousel.as_mut() {
                    c.pointer_move(x, now, &mut self.driver, &mut self.surface);
                }
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerLeave => {
                if let Some(c) = self.screens.carousel.as_mut() {
                    c.pointer_up(now, &mut self.driver, &mut self.surface);
                }
            }
            InputEvent::CardClick { index } => {
                let outcome = match self.screens.carousel.as_mut() {
                    Some(c) => c.click(index, &mut self.driver, &self.surface),
                    None => ClickOutcome::Ignored,
                };
                if let ClickOutcome::Activate(index) = outcome {
                    self.pending.push(StageEvent::CardActivated { index });
                    let _ = self.navigate(Screen::Detail, Method::Slide);
                }
            }
            InputEvent::CardHover { index, x, y } => {
                if let Some(c) = self.screens.carousel.as_mut() {
                    c.hover(index, x, y, &mut self.driver, &self.surface);
                }
            }
            InputEvent::CardLeave { index } => {
                if let Some(c) = self.screens.carousel.as_mut() {
                    c.hover_end(index, &mut self.driver, &self.surface);
                }
            }
            InputEvent::Navigate { screen, method } => {
                let _ = self.navigate(screen, method);
            }
        }
    }

    fn collect_transition_events(&mut self) {
        for e in self.transition.drain_events() {
            self.pending.push(match e {
                TransitionEvent::ScreenChanged { from, to } => StageEvent::ScreenChanged { from, to },
                TransitionEvent::Finished {
                    target,
                    method,
                    result,
                } => StageEvent::TransitionFinished {
                    target,
                    method,
                    result,
                },
            });
        }
    }

    pub fn screen(&self) -> Screen {
        self.transition.screen()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_transitioning()
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        self.screens.carousel.as_ref()
    }

    pub fn splash(&self) -> Option<&Splash> {
        self.screens.splash.as_ref()
    }

    /// Root element of the mounted screen.
    pub fn screen_root(&self) -> Option<ElementId> {
        self.screens.root
    }

    pub fn items(&self) -> &[CarouselItem] {
        &self.screens.items
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Seconds accumulated through `update`.
    pub fn clock(&self) -> f32 {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_splash_with_one_root() {
        let stage = Stage::new(Config::default(), Viewport::new(1000.0, 800.0), Vec::new());
        assert_eq!(stage.screen(), Screen::Splash);
        assert!(stage.splash().is_some());
        assert!(stage.carousel().is_none());
        assert_eq!(
            stage.surface().count(&ElementKind::ScreenRoot {
                screen: Screen::Splash
            }),
            1
        );
    }

    #[test]
    fn first_update_reports_initial_mounts() {
        let mut stage = Stage::new(Config::default(), Viewport::new(1000.0, 800.0), Vec::new());
        let out = stage.update(0.0, &Inputs::default());
        assert!(out
            .changes
            .iter()
            .any(|c| matches!(c, crate::surface::SurfaceChange::Mounted { kind: ElementKind::SplashBar, .. })));
        let again = stage.update(0.0, &Inputs::default());
        assert!(again.changes.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = Stage::from_json("{", "[]", Viewport::new(10.0, 10.0)).unwrap_err();
        assert!(matches!(err, StageError::Config(_)));
        let err = Stage::from_json("{}", "{}", Viewport::new(10.0, 10.0)).unwrap_err();
        assert!(matches!(err, StageError::Deck(_)));
    }
}
