//! Per-card tilt, idle float motion and hover tilt.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::layout::CarouselGeometry;
use crate::config::CarouselConfig;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tilt {
    /// Degrees around the vertical axis.
    pub rotation: f32,
    pub scale: f32,
}

/// Tilt of card `index` for a track offset.
///
/// Rotation is proportional to the card's signed distance from viewport
/// center and saturates at `±max_rotation`; scale falls off linearly from
/// `max_scale` at center to `min_scale` at the viewport edge.
pub fn compute_tilt(
    offset: f32,
    geometry: &CarouselGeometry,
    index: usize,
    cfg: &CarouselConfig,
) -> Tilt {
    let max_rotation = cfg.max_rotation.abs();
    let (min_scale, max_scale) = (cfg.min_scale.min(cfg.max_scale), cfg.min_scale.max(cfg.max_scale));
    let center = geometry.viewport_center();
    if center <= 0.0 {
        return Tilt {
            rotation: 0.0,
            scale: max_scale,
        };
    }
    let distance = geometry.card_center(index, offset) - center;
    let rotation = (-(distance / center) * max_rotation).clamp(-max_rotation, max_rotation);
    let ratio = (distance.abs() / center).min(1.0);
    let scale = (max_scale - (max_scale - min_scale) * ratio).clamp(min_scale, max_scale);
    // Normalize -0.0 so a centered card reports exactly zero.
    let rotation = if rotation == 0.0 { 0.0 } else { rotation };
    Tilt { rotation, scale }
}

/// Idle vertical oscillation of one card.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatMotion {
    pub amplitude: f32,
    /// Seconds per half cycle.
    pub period: f32,
    pub delay: f32,
}

/// Deterministic per-card float parameters for a seed.
pub fn float_motions(count: usize, cfg: &CarouselConfig, seed: u64) -> Vec<FloatMotion> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let (amp_lo, amp_hi) = cfg.float_amplitude.ordered();
    let (per_lo, per_hi) = cfg.float_period.ordered();
    (0..count)
        .map(|i| FloatMotion {
            amplitude: rng.random_range(amp_lo..=amp_hi),
            period: rng.random_range(per_lo..=per_hi),
            delay: i as f32 * cfg.float_stagger,
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoverTilt {
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub scale: f32,
}

impl HoverTilt {
    pub const REST: HoverTilt = HoverTilt {
        rotate_x: 0.0,
        rotate_y: 0.0,
        scale: 1.0,
    };
}

/// Tilt toward a pointer at `(x, y)` relative to a `width x height` card face.
pub fn compute_hover_tilt(x: f32, y: f32, width: f32, height: f32, cfg: &CarouselConfig) -> HoverTilt {
    let cx = width * 0.5;
    let cy = height * 0.5;
    if cx <= 0.0 || cy <= 0.0 {
        return HoverTilt::REST;
    }
    let max = cfg.hover_max_rotation.abs();
    HoverTilt {
        rotate_x: (-((y - cy) / cy) * max).clamp(-max, max),
        rotate_y: (((x - cx) / cx) * max).clamp(-max, max),
        scale: cfg.hover_scale,
    }
}
