//! Horizontal draggable with edge resistance and inertial throw.
//!
//! Pointer positions arrive with timestamps (seconds on the stage clock). A
//! press only becomes a drag after the pointer travels `DRAG_THRESHOLD`
//! pixels, so a press/release without travel is reported as a click.
//!
//! Throw physics is exponential decay with time constant `throw_resistance`:
//! velocity `v(t) = v0 * e^(-t/tau)`, so deceleration is proportional to the
//! current velocity and the total travel is `v0 * tau`. The throw stops at the
//! bounds or once velocity falls below `STOP_SPEED`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

const DRAG_THRESHOLD: f32 = 3.0;
const VELOCITY_WINDOW: f32 = 0.1;
const MIN_THROW_SPEED: f32 = 20.0;
const STOP_SPEED: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragBounds {
    pub min: f32,
    pub max: f32,
}

impl DragBounds {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    #[inline]
    pub fn clamp(&self, v: f32) -> f32 {
        v.clamp(self.min, self.max)
    }

    /// Damp the part of `raw` that lies outside the bounds.
    #[inline]
    pub fn resist(&self, raw: f32, edge_resistance: f32) -> f32 {
        let keep = (1.0 - edge_resistance).clamp(0.0, 1.0);
        if raw > self.max {
            self.max + (raw - self.max) * keep
        } else if raw < self.min {
            self.min - (self.min - raw) * keep
        } else {
            raw
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragSpec {
    pub bounds: DragBounds,
    /// 0 = free overshoot, 1 = hard stop at the bounds.
    pub edge_resistance: f32,
    pub inertia: bool,
    /// Seconds.
    pub throw_resistance: f32,
}

/// How a pointer release ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragRelease {
    /// Released without passing the drag threshold.
    Click,
    /// Drag ended in place; the value is clamped into bounds.
    Settled(f32),
    /// Drag ended with a throw; values follow from `tick`.
    Thrown,
    /// No press was active.
    Idle,
}

#[derive(Clone, Debug, PartialEq)]
enum DragState {
    Idle,
    Pressed {
        pointer_start: f32,
        value_start: f32,
    },
    Dragging {
        pointer_start: f32,
        value_start: f32,
    },
    Throwing {
        origin: f32,
        velocity: f32,
        elapsed: f32,
    },
}

#[derive(Debug, Clone)]
pub struct Draggable {
    spec: DragSpec,
    value: f32,
    state: DragState,
    samples: VecDeque<(f32, f32)>,
    killed: bool,
}

impl Draggable {
    pub fn new(spec: DragSpec, value: f32) -> Self {
        Self {
            spec,
            value,
            state: DragState::Idle,
            samples: VecDeque::new(),
            killed: false,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn bounds(&self) -> DragBounds {
        self.spec.bounds
    }

    pub fn set_bounds(&mut self, bounds: DragBounds) {
        self.spec.bounds = bounds;
        self.value = bounds.clamp(self.value);
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn is_throwing(&self) -> bool {
        matches!(self.state, DragState::Throwing { .. })
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn press(&mut self, pointer: f32, now: f32) {
        if self.killed {
            return;
        }
        self.state = DragState::Pressed {
            pointer_start: pointer,
            value_start: self.value,
        };
        self.samples.clear();
        self.samples.push_back((now, pointer));
    }

    /// Pointer moved while pressed. Returns the new (possibly resisted, unclamped) value.
    pub fn drag(&mut self, pointer: f32, now: f32) -> Option<f32> {
        let (pointer_start, value_start) = match self.state {
            DragState::Pressed {
                pointer_start,
                value_start,
            } => {
                if (pointer - pointer_start).abs() < DRAG_THRESHOLD {
                    return None;
                }
                self.state = DragState::Dragging {
                    pointer_start,
                    value_start,
                };
                (pointer_start, value_start)
            }
            DragState::Dragging {
                pointer_start,
                value_start,
            } => (pointer_start, value_start),
            _ => return None,
        };
        self.samples.push_back((now, pointer));
        while let Some((t, _)) = self.samples.front().copied() {
            if now - t > VELOCITY_WINDOW && self.samples.len() > 2 {
                self.samples.pop_front();
            } else {
                break;
            }
        }
        let raw = value_start + (pointer - pointer_start);
        self.value = self.spec.bounds.resist(raw, self.spec.edge_resistance);
        Some(self.value)
    }

    /// Velocity over the samples inside the window ending at `now`. A pointer
    /// that has been still for longer than the window has no velocity.
    fn release_velocity(&self, now: f32) -> f32 {
        let Some(&(t1, x1)) = self.samples.back() else {
            return 0.0;
        };
        if now - t1 > VELOCITY_WINDOW {
            return 0.0;
        }
        match self.samples.iter().find(|(t, _)| now - t <= VELOCITY_WINDOW) {
            Some(&(t0, x0)) if t1 > t0 => (x1 - x0) / (t1 - t0),
            _ => 0.0,
        }
    }

    pub fn release(&mut self, now: f32) -> DragRelease {
        let outcome = match self.state {
            DragState::Pressed { .. } => DragRelease::Click,
            DragState::Dragging { .. } => {
                let velocity = self.release_velocity(now);
                self.value = self.spec.bounds.clamp(self.value);
                if self.spec.inertia && velocity.abs() >= MIN_THROW_SPEED {
                    self.state = DragState::Throwing {
                        origin: self.value,
                        velocity,
                        elapsed: 0.0,
                    };
                    self.samples.clear();
                    return DragRelease::Thrown;
                }
                DragRelease::Settled(self.value)
            }
            _ => DragRelease::Idle,
        };
        self.state = DragState::Idle;
        self.samples.clear();
        outcome
    }

    /// Advance a throw. Returns the new value while throwing.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        let DragState::Throwing {
            origin,
            velocity,
            elapsed,
        } = &mut self.state
        else {
            return None;
        };
        let tau = self.spec.throw_resistance.max(1e-3);
        *elapsed += dt.max(0.0);
        let decay = (-*elapsed / tau).exp();
        let raw = *origin + *velocity * tau * (1.0 - decay);
        let speed = (*velocity * decay).abs();
        let clamped = self.spec.bounds.clamp(raw);
        self.value = clamped;
        if clamped != raw || speed < STOP_SPEED {
            self.state = DragState::Idle;
        }
        Some(self.value)
    }

    /// Stop any drag or throw in place.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
        self.samples.clear();
        self.value = self.spec.bounds.clamp(self.value);
    }

    /// Sync to a value written by someone else (scroll, snap).
    pub fn update(&mut self, value: f32) {
        if !self.is_dragging() {
            self.value = self.spec.bounds.clamp(value);
        }
    }

    pub fn kill(&mut self) {
        self.cancel();
        self.killed = true;
    }
}
