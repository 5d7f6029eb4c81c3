//! Stage configuration: motion timings, carousel metrics and splash timeline.
//!
//! Every struct carries `#[serde(default)]` so hosts can pass a partial JSON
//! object and override only what they need.

use serde::{Deserialize, Serialize};

use crate::driver::TweenOpts;
use crate::ease::Ease;
use crate::error::StageError;

/// Duration and easing of one animated step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Seconds.
    pub duration: f32,
    pub ease: Ease,
}

impl Motion {
    pub const fn new(duration: f32, ease: Ease) -> Self {
        Self { duration, ease }
    }

    pub fn opts(&self) -> TweenOpts {
        TweenOpts::new(self.duration, self.ease)
    }
}

/// Inclusive numeric range for randomized parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Bounds in ascending order, tolerating swapped configs.
    pub fn ordered(&self) -> (f32, f32) {
        (self.min.min(self.max), self.min.max(self.max))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transition: TransitionConfig,
    pub carousel: CarouselConfig,
    pub splash: SplashConfig,
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, StageError> {
        serde_json::from_str(text).map_err(StageError::Config)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Diameter of the bubble element before scaling.
    pub bubble_size: f32,
    pub bubble_grow: Motion,
    pub bubble_shrink: Motion,
    /// Seconds between the slide swap and the entrance animation.
    pub slide_delay: f32,
    pub slide: Motion,
    /// Starting vertical offset of the slide entrance, in percent of the root height.
    pub slide_offset_percent: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            bubble_size: 50.0,
            bubble_grow: Motion::new(0.6, Ease::Power2Out),
            bubble_shrink: Motion::new(0.45, Ease::Power2In),
            slide_delay: 0.03,
            slide: Motion::new(0.6, Ease::Power3Out),
            slide_offset_percent: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub max_card_size: f32,
    /// Floor for the card edge on narrow viewports.
    pub min_card_size: f32,
    /// Card edge as a fraction of viewport width.
    pub card_ratio: f32,
    /// Gap between cards as a fraction of viewport width.
    pub gap_ratio: f32,

    /// Degrees.
    pub max_rotation: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub tilt: Motion,
    pub perspective: f32,

    pub snap: Motion,

    /// Scroll position at which the container top meets the viewport top.
    pub scroll_start: f32,
    /// Seconds of smoothing between scroll position and track offset; 0 is lock-step.
    pub scrub: f32,

    pub edge_resistance: f32,
    pub inertia: bool,
    /// Time constant (seconds) of the exponential throw decay.
    pub throw_resistance: f32,

    pub float_amplitude: Range,
    pub float_period: Range,
    pub float_stagger: f32,
    pub float_seed: u64,

    pub hover_max_rotation: f32,
    pub hover_scale: f32,
    pub hover_perspective: f32,
    pub hover_in: Motion,
    pub hover_out: Motion,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            max_card_size: 512.0,
            min_card_size: 250.0,
            card_ratio: 0.6,
            gap_ratio: 0.05,
            max_rotation: 20.0,
            min_scale: 0.7,
            max_scale: 1.1,
            tilt: Motion::new(0.3, Ease::Power3Out),
            perspective: 1000.0,
            snap: Motion::new(0.5, Ease::Power3Out),
            scroll_start: 0.0,
            scrub: 0.0,
            edge_resistance: 0.9,
            inertia: true,
            throw_resistance: 0.35,
            float_amplitude: Range::new(5.0, 10.0),
            float_period: Range::new(1.5, 3.0),
            float_stagger: 0.2,
            float_seed: 0x5EED_CA11,
            hover_max_rotation: 12.0,
            hover_scale: 1.06,
            hover_perspective: 900.0,
            hover_in: Motion::new(0.35, Ease::Power3Out),
            hover_out: Motion::new(0.6, Ease::Power3Out),
        }
    }
}

/// One leg of the loading bar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplashStep {
    /// Bar width in percent of its track.
    pub percent: f32,
    pub motion: Motion,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplashConfig {
    pub steps: Vec<SplashStep>,
    pub squeeze_scale: f32,
    pub squeeze: Motion,
    pub warp_scale: f32,
    pub warp: Motion,
    /// Seconds after start at which the stage leaves the splash screen regardless.
    pub fallback_secs: f32,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            steps: vec![
                SplashStep {
                    percent: 50.0,
                    motion: Motion::new(0.8, Ease::Power2Out),
                },
                SplashStep {
                    percent: 70.0,
                    motion: Motion::new(1.0, Ease::Power1InOut),
                },
                SplashStep {
                    percent: 100.0,
                    motion: Motion::new(0.5, Ease::Power2In),
                },
            ],
            squeeze_scale: 0.5,
            squeeze: Motion::new(0.3, Ease::Power2InOut),
            warp_scale: 20.0,
            warp: Motion::new(0.5, Ease::Power3In),
            fallback_secs: 4.0,
        }
    }
}
