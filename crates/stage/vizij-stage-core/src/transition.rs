//! Screen transition engine.
//!
//! Owns the active [`Screen`] and the transition state. `navigate` is
//! re-entrancy safe: while a transition is in flight further requests are
//! dropped (not queued). Each accepted request returns a [`Completion`] that
//! resolves on every exit path, including degraded and interrupted ones.
//!
//! Strategies are phase machines advanced by driver events:
//! - bubble: grow → swap → shrink → remove → resolve
//! - slide: swap → settle delay → entrance from_to → resolve

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::str::FromStr;
use std::task::{Context, Poll, Waker};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::TransitionConfig;
use crate::driver::{Driver, TweenEvent};
use crate::error::StageError;
use crate::ids::{ElementId, TweenId};
use crate::surface::{ElementKind, Prop, Surface};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Splash,
    Home,
    Chapters,
    Detail,
}

impl Screen {
    pub const ALL: [Screen; 4] = [Screen::Splash, Screen::Home, Screen::Chapters, Screen::Detail];

    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Splash => "splash",
            Screen::Home => "home",
            Screen::Chapters => "chapters",
            Screen::Detail => "detail",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StageError::UnknownScreen { name: s.to_string() })
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Bubble,
    Slide,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Bubble => "bubble",
            Method::Slide => "slide",
        })
    }
}

impl FromStr for Method {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bubble" => Ok(Method::Bubble),
            "slide" => Ok(Method::Slide),
            _ => Err(StageError::UnknownMethod { name: s.to_string() }),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradeReason {
    /// No layer to host the bubble; the screen was swapped instantly.
    NoTransitionLayer,
    /// The new screen's root was gone before the slide could start.
    MissingScreenRoot,
    /// A transition tween vanished without completing.
    Interrupted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TransitionResult {
    Animated,
    Degraded(DegradeReason),
}

#[derive(Debug, Default)]
struct CompletionState {
    result: Option<TransitionResult>,
    waker: Option<Waker>,
}

/// Completion signal of an accepted navigation. Await it, or poll `is_resolved`.
#[derive(Clone, Debug, Default)]
pub struct Completion {
    inner: Rc<RefCell<CompletionState>>,
}

impl Completion {
    fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, result: TransitionResult) {
        let waker = {
            let mut st = self.inner.borrow_mut();
            if st.result.is_some() {
                return;
            }
            st.result = Some(result);
            st.waker.take()
        };
        if let Some(w) = waker {
            w.wake();
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.borrow().result.is_some()
    }

    pub fn result(&self) -> Option<TransitionResult> {
        self.inner.borrow().result
    }
}

impl Future for Completion {
    type Output = TransitionResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut st = self.inner.borrow_mut();
        match st.result {
            Some(result) => Poll::Ready(result),
            None => {
                st.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Outcome of a `navigate` request.
#[must_use = "a navigation may be dropped; inspect or await it"]
#[derive(Debug)]
pub enum Navigation {
    Accepted(Completion),
    /// Another transition was in flight; nothing happened.
    Dropped,
}

impl Navigation {
    pub fn is_dropped(&self) -> bool {
        matches!(self, Navigation::Dropped)
    }

    pub fn completion(self) -> Option<Completion> {
        match self {
            Navigation::Accepted(c) => Some(c),
            Navigation::Dropped => None,
        }
    }
}

/// Mount/unmount lifecycle of screens, implemented by the stage.
pub trait ScreenHost {
    /// Unmount `from`, mount `to`, and return the new screen's root element.
    fn swap_screen(
        &mut self,
        from: Screen,
        to: Screen,
        driver: &mut Driver,
        surface: &mut Surface,
    ) -> Option<ElementId>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TransitionEvent {
    ScreenChanged {
        from: Screen,
        to: Screen,
    },
    Finished {
        target: Screen,
        method: Method,
        result: TransitionResult,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Growing { bubble: ElementId, tween: TweenId },
    Shrinking { bubble: ElementId, tween: TweenId },
    Settling { root: Option<ElementId>, remaining: f32 },
    Sliding { tween: TweenId },
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TransitionState {
    Idle,
    InTransition {
        target: Screen,
        method: Method,
        phase: Phase,
    },
}

#[derive(Debug)]
pub struct TransitionEngine {
    cfg: TransitionConfig,
    current: Screen,
    state: TransitionState,
    completion: Option<Completion>,
    events: Vec<TransitionEvent>,
}

impl TransitionEngine {
    pub fn new(cfg: TransitionConfig, initial: Screen) -> Self {
        Self {
            cfg,
            current: initial,
            state: TransitionState::Idle,
            completion: None,
            events: Vec::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, TransitionState::InTransition { .. })
    }

    /// Target of the transition in flight, if any.
    pub fn pending_target(&self) -> Option<Screen> {
        match self.state {
            TransitionState::InTransition { target, .. } => Some(target),
            TransitionState::Idle => None,
        }
    }

    pub fn navigate(
        &mut self,
        target: Screen,
        method: Method,
        driver: &mut Driver,
        surface: &mut Surface,
        host: &mut dyn ScreenHost,
    ) -> Navigation {
        if self.is_transitioning() {
            debug!("navigate({target}, {method}) dropped: transition in flight");
            return Navigation::Dropped;
        }
        let completion = Completion::new();
        self.completion = Some(completion.clone());
        info!("transition {} -> {target} via {method}", self.current);
        match method {
            Method::Bubble => self.begin_bubble(target, driver, surface, host),
            Method::Slide => self.begin_slide(target, driver, surface, host),
        }
        Navigation::Accepted(completion)
    }

    fn begin_bubble(
        &mut self,
        target: Screen,
        driver: &mut Driver,
        surface: &mut Surface,
        host: &mut dyn ScreenHost,
    ) {
        let Some(layer) = surface.transition_layer() else {
            warn!("no transition layer; swapping to {target} without animation");
            self.swap(target, driver, surface, host);
            self.finish(
                target,
                Method::Bubble,
                TransitionResult::Degraded(DegradeReason::NoTransitionLayer),
            );
            return;
        };

        // A leftover bubble would stack under the new one.
        surface.clear_children(layer);
        let bubble = surface.create(ElementKind::Bubble, Some(layer));
        let seed = self.cfg.bubble_size.max(1.0);
        let vp = surface.viewport();
        driver.set(
            surface,
            bubble,
            &[
                (Prop::Width, seed),
                (Prop::Height, seed),
                (Prop::X, vp.width * 0.5),
                (Prop::Y, vp.height * 0.5),
                (Prop::Scale, 0.0),
            ],
        );
        let cover = vp.width.max(vp.height) * 2.0 / seed;
        let tween = driver.to(
            surface,
            bubble,
            &[(Prop::Scale, cover)],
            self.cfg.bubble_grow.opts(),
        );
        self.state = TransitionState::InTransition {
            target,
            method: Method::Bubble,
            phase: Phase::Growing { bubble, tween },
        };
    }

    fn begin_slide(
        &mut self,
        target: Screen,
        driver: &mut Driver,
        surface: &mut Surface,
        host: &mut dyn ScreenHost,
    ) {
        let root = self.swap(target, driver, surface, host);
        self.state = TransitionState::InTransition {
            target,
            method: Method::Slide,
            phase: Phase::Settling {
                root,
                remaining: self.cfg.slide_delay,
            },
        };
    }

    fn swap(
        &mut self,
        target: Screen,
        driver: &mut Driver,
        surface: &mut Surface,
        host: &mut dyn ScreenHost,
    ) -> Option<ElementId> {
        let from = self.current;
        let root = host.swap_screen(from, target, driver, surface);
        self.current = target;
        self.events.push(TransitionEvent::ScreenChanged { from, to: target });
        root
    }

    fn finish(&mut self, target: Screen, method: Method, result: TransitionResult) {
        self.state = TransitionState::Idle;
        if let Some(c) = self.completion.take() {
            c.resolve(result);
        }
        if let TransitionResult::Degraded(reason) = result {
            warn!("transition to {target} degraded: {reason:?}");
        }
        self.events.push(TransitionEvent::Finished {
            target,
            method,
            result,
        });
    }

    /// Advance the phase machine with this tick's driver events.
    pub fn tick(
        &mut self,
        dt: f32,
        events: &[TweenEvent],
        driver: &mut Driver,
        surface: &mut Surface,
        host: &mut dyn ScreenHost,
    ) {
        let TransitionState::InTransition {
            target,
            method,
            phase,
        } = self.state
        else {
            return;
        };

        match phase {
            Phase::Growing { bubble, tween } => {
                if events.contains(&TweenEvent::Completed(tween)) {
                    // New screen mounts while fully covered.
                    self.swap(target, driver, surface, host);
                    let shrink = driver.to(
                        surface,
                        bubble,
                        &[(Prop::Scale, 0.0)],
                        self.cfg.bubble_shrink.opts(),
                    );
                    self.state = TransitionState::InTransition {
                        target,
                        method,
                        phase: Phase::Shrinking {
                            bubble,
                            tween: shrink,
                        },
                    };
                } else if !driver.is_active(tween) {
                    surface.remove(bubble);
                    self.swap(target, driver, surface, host);
                    self.finish(
                        target,
                        method,
                        TransitionResult::Degraded(DegradeReason::Interrupted),
                    );
                }
            }
            Phase::Shrinking { bubble, tween } => {
                if events.contains(&TweenEvent::Completed(tween)) {
                    surface.remove(bubble);
                    self.finish(target, method, TransitionResult::Animated);
                } else if !driver.is_active(tween) {
                    surface.remove(bubble);
                    self.finish(
                        target,
                        method,
                        TransitionResult::Degraded(DegradeReason::Interrupted),
                    );
                }
            }
            Phase::Settling { root, remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.state = TransitionState::InTransition {
                        target,
                        method,
                        phase: Phase::Settling { root, remaining },
                    };
                    return;
                }
                match root.filter(|r| surface.contains(*r)) {
                    Some(root) => {
                        let tween = driver.from_to(
                            surface,
                            root,
                            &[
                                (Prop::YPercent, self.cfg.slide_offset_percent),
                                (Prop::Opacity, 0.0),
                            ],
                            &[(Prop::YPercent, 0.0), (Prop::Opacity, 1.0)],
                            self.cfg.slide.opts(),
                        );
                        self.state = TransitionState::InTransition {
                            target,
                            method,
                            phase: Phase::Sliding { tween },
                        };
                    }
                    None => self.finish(
                        target,
                        method,
                        TransitionResult::Degraded(DegradeReason::MissingScreenRoot),
                    ),
                }
            }
            Phase::Sliding { tween } => {
                if events.contains(&TweenEvent::Completed(tween)) {
                    self.finish(target, method, TransitionResult::Animated);
                } else if !driver.is_active(tween) {
                    self.finish(
                        target,
                        method,
                        TransitionResult::Degraded(DegradeReason::Interrupted),
                    );
                }
            }
        }
    }

    pub fn drain_events(&mut self) -> Vec<TransitionEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Drop for TransitionEngine {
    fn drop(&mut self) {
        if let Some(c) = self.completion.take() {
            c.resolve(TransitionResult::Degraded(DegradeReason::Interrupted));
        }
    }
}
