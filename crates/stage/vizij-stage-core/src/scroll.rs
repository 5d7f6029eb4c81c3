//! Scroll-coupled value binding.
//!
//! Maps page scroll inside `[start, start + distance]` linearly onto
//! `[from, to]`. With `scrub == 0` the value follows scroll in lock-step;
//! otherwise it converges toward the scroll-derived target with an
//! exponential catch-up of roughly `scrub` seconds. The binding only produces
//! a value when scroll moved or smoothing is still converging, so other
//! writers of the same value are not overridden every frame.

use serde::{Deserialize, Serialize};

/// Convergence rate such that about 99% of the gap closes within `scrub` seconds.
const SCRUB_RATE: f32 = 4.6;
const SETTLE_EPSILON: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollSpec {
    /// Scroll position at which the binding starts (trigger top meets viewport top).
    pub start: f32,
    /// Scroll length of the binding.
    pub distance: f32,
    pub from: f32,
    pub to: f32,
    /// Seconds of smoothing; 0 is lock-step.
    pub scrub: f32,
    /// Whether the trigger element is pinned while the binding is active.
    pub pin: bool,
}

impl ScrollSpec {
    pub fn progress_at(&self, scroll: f32) -> f32 {
        if self.distance <= 0.0 {
            return if scroll > self.start { 1.0 } else { 0.0 };
        }
        ((scroll - self.start) / self.distance).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, scroll: f32) -> f32 {
        self.from + (self.to - self.from) * self.progress_at(scroll)
    }
}

#[derive(Debug, Clone)]
pub struct ScrollBinding {
    spec: ScrollSpec,
    scroll: f32,
    value: f32,
    dirty: bool,
    killed: bool,
}

impl ScrollBinding {
    pub fn new(spec: ScrollSpec, scroll: f32) -> Self {
        Self {
            value: spec.value_at(scroll),
            spec,
            scroll,
            dirty: false,
            killed: false,
        }
    }

    pub fn spec(&self) -> &ScrollSpec {
        &self.spec
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn progress(&self) -> f32 {
        self.spec.progress_at(self.scroll)
    }

    pub fn on_scroll(&mut self, scroll: f32) {
        if self.killed || scroll == self.scroll {
            return;
        }
        self.scroll = scroll;
        self.dirty = true;
    }

    /// Advance smoothing. Returns the new value when it changed this tick.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        if self.killed || !self.dirty {
            return None;
        }
        let target = self.spec.value_at(self.scroll);
        if self.spec.scrub <= 0.0 {
            self.value = target;
            self.dirty = false;
            return Some(self.value);
        }
        let k = 1.0 - (-dt.max(0.0) * SCRUB_RATE / self.spec.scrub).exp();
        self.value += (target - self.value) * k;
        if (target - self.value).abs() < SETTLE_EPSILON {
            self.value = target;
            self.dirty = false;
        }
        Some(self.value)
    }

    /// Swap in a new spec (after a layout change) and jump to its scroll-derived value.
    pub fn refresh(&mut self, spec: ScrollSpec) -> f32 {
        self.spec = spec;
        self.value = spec.value_at(self.scroll);
        self.dirty = false;
        self.value
    }

    pub fn is_pinned(&self) -> bool {
        !self.killed
            && self.spec.pin
            && self.scroll >= self.spec.start
            && self.scroll <= self.spec.start + self.spec.distance.max(0.0)
    }

    pub fn kill(&mut self) {
        self.killed = true;
        self.dirty = false;
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(scrub: f32) -> ScrollSpec {
        ScrollSpec {
            start: 0.0,
            distance: 1198.0,
            from: 244.0,
            to: -880.0,
            scrub,
            pin: true,
        }
    }

    #[test]
    fn lock_step_maps_scroll_linearly() {
        let mut b = ScrollBinding::new(spec(0.0), 0.0);
        assert_eq!(b.value(), 244.0);
        assert_eq!(b.tick(0.016), None);

        b.on_scroll(599.0);
        let v = b.tick(0.016).unwrap();
        assert!((v - (244.0 - 562.0)).abs() < 1e-3);
        assert_eq!(b.tick(0.016), None);

        b.on_scroll(5000.0);
        assert_eq!(b.tick(0.016), Some(-880.0));
        assert!(!b.is_pinned());
    }

    #[test]
    fn scrub_converges_over_time() {
        let mut b = ScrollBinding::new(spec(1.0), 0.0);
        b.on_scroll(1198.0);
        let first = b.tick(0.1).unwrap();
        assert!(first < 244.0 && first > -880.0);
        let mut last = first;
        for _ in 0..200 {
            if let Some(v) = b.tick(0.05) {
                last = v;
            }
        }
        assert_eq!(last, -880.0);
    }

    #[test]
    fn zero_distance_does_not_divide() {
        let s = ScrollSpec {
            distance: 0.0,
            ..spec(0.0)
        };
        assert_eq!(s.value_at(0.0), 244.0);
        assert_eq!(s.value_at(1.0), -880.0);
    }

    #[test]
    fn killed_binding_is_inert() {
        let mut b = ScrollBinding::new(spec(0.0), 0.0);
        assert!(b.is_pinned());
        b.kill();
        b.on_scroll(100.0);
        assert_eq!(b.tick(0.016), None);
        assert!(!b.is_pinned());
    }
}
