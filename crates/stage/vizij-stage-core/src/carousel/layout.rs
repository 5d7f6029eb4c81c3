//! Carousel geometry derived from viewport width and card count.

use serde::{Deserialize, Serialize};

use crate::config::CarouselConfig;
use crate::content::CarouselItem;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarouselGeometry {
    pub viewport_width: f32,
    pub count: usize,
    pub card_width: f32,
    pub card_height: f32,
    pub gap: f32,
    /// `n * card_width + (n - 1) * gap`; 0 without cards.
    pub total_extent: f32,
    /// Offset that centers the last card.
    pub min_offset: f32,
    /// Offset that centers the first card.
    pub max_offset: f32,
}

/// Pure function of its inputs: identical arguments always yield identical geometry.
pub fn compute_geometry(
    items: &[CarouselItem],
    viewport_width: f32,
    cfg: &CarouselConfig,
) -> CarouselGeometry {
    geometry_for_count(items.len(), viewport_width, cfg)
}

pub fn geometry_for_count(count: usize, viewport_width: f32, cfg: &CarouselConfig) -> CarouselGeometry {
    let viewport_width = viewport_width.max(0.0);
    let center = viewport_width * 0.5;
    let card = (viewport_width * cfg.card_ratio)
        .min(cfg.max_card_size)
        .max(cfg.min_card_size.min(cfg.max_card_size));
    let gap = viewport_width * cfg.gap_ratio;
    let total_extent = if count == 0 {
        0.0
    } else {
        count as f32 * card + (count - 1) as f32 * gap
    };
    let max_offset = center - card * 0.5;
    let span = count.saturating_sub(1) as f32 * (card + gap);
    let min_offset = (max_offset - span).min(max_offset);
    CarouselGeometry {
        viewport_width,
        count,
        card_width: card,
        card_height: card,
        gap,
        total_extent,
        min_offset,
        max_offset,
    }
}

impl CarouselGeometry {
    #[inline]
    pub fn viewport_center(&self) -> f32 {
        self.viewport_width * 0.5
    }

    #[inline]
    pub fn stride(&self) -> f32 {
        self.card_width + self.gap
    }

    #[inline]
    pub fn clamp_offset(&self, offset: f32) -> f32 {
        offset.clamp(self.min_offset, self.max_offset)
    }

    /// Horizontal center of card `index` in viewport coordinates for a track offset.
    #[inline]
    pub fn card_center(&self, index: usize, offset: f32) -> f32 {
        index as f32 * self.stride() + self.card_width * 0.5 + offset
    }

    /// Track offset that centers card `index`, clamped to bounds.
    pub fn centering_offset(&self, index: usize) -> f32 {
        self.clamp_offset(
            -(index as f32 * self.stride()) + self.viewport_center() - self.card_width * 0.5,
        )
    }

    /// Scroll length over which the track is scrubbed from first to last card.
    pub fn scroll_distance(&self) -> f32 {
        (self.total_extent - self.viewport_width).max(0.0)
    }
}
