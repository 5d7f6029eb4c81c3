//! Easing curves for driver tweens.
//!
//! Names follow the `powerN.in/out/inOut` convention (power1 = quadratic,
//! power2 = cubic, power3 = quartic, power4 = quintic) so JSON configs read the
//! way motion specs are usually written. `cubicBezier` takes CSS-style control
//! points `(x1, y1, x2, y2)`.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    #[serde(rename = "none", alias = "linear")]
    Linear,
    #[serde(rename = "power1.in")]
    Power1In,
    #[serde(rename = "power1.out")]
    Power1Out,
    #[serde(rename = "power1.inOut")]
    Power1InOut,
    #[serde(rename = "power2.in")]
    Power2In,
    #[serde(rename = "power2.out")]
    Power2Out,
    #[serde(rename = "power2.inOut")]
    Power2InOut,
    #[serde(rename = "power3.in")]
    Power3In,
    #[serde(rename = "power3.out")]
    Power3Out,
    #[serde(rename = "power3.inOut")]
    Power3InOut,
    #[serde(rename = "power4.in")]
    Power4In,
    #[serde(rename = "power4.out")]
    Power4Out,
    #[serde(rename = "power4.inOut")]
    Power4InOut,
    #[serde(rename = "sine.in")]
    SineIn,
    #[serde(rename = "sine.out")]
    SineOut,
    #[serde(rename = "sine.inOut")]
    SineInOut,
    #[serde(rename = "cubicBezier")]
    CubicBezier([f32; 4]),
}

impl Ease {
    /// Map linear progress in [0, 1] to eased progress. Input is clamped.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1In => ease_in(t, 2),
            Ease::Power1Out => ease_out(t, 2),
            Ease::Power1InOut => ease_in_out(t, 2),
            Ease::Power2In => ease_in(t, 3),
            Ease::Power2Out => ease_out(t, 3),
            Ease::Power2InOut => ease_in_out(t, 3),
            Ease::Power3In => ease_in(t, 4),
            Ease::Power3Out => ease_out(t, 4),
            Ease::Power3InOut => ease_in_out(t, 4),
            Ease::Power4In => ease_in(t, 5),
            Ease::Power4Out => ease_out(t, 5),
            Ease::Power4InOut => ease_in_out(t, 5),
            Ease::SineIn => 1.0 - (t * PI * 0.5).cos(),
            Ease::SineOut => (t * PI * 0.5).sin(),
            Ease::SineInOut => -((PI * t).cos() - 1.0) * 0.5,
            Ease::CubicBezier([x1, y1, x2, y2]) => bezier_ease_t(t, x1, y1, x2, y2),
        }
    }
}

#[inline]
fn ease_in(t: f32, power: i32) -> f32 {
    t.powi(power)
}

#[inline]
fn ease_out(t: f32, power: i32) -> f32 {
    1.0 - (1.0 - t).powi(power)
}

#[inline]
fn ease_in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        (2.0 * t).powi(power) * 0.5
    } else {
        1.0 - (2.0 * (1.0 - t)).powi(power) * 0.5
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Invert the x bezier via binary search, then evaluate y.
#[inline]
fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}
