//! Carousel: layout, tilt and gesture handling for a horizontal card track.
//!
//! - `layout`: pure geometry from viewport width and card count
//! - `tilt`: per-card rotation/scale, idle float, hover tilt
//! - `gesture`: the mounted [`Carousel`] owning offset, drag, scroll and snap

pub mod layout;
pub mod tilt;

mod gesture;

pub use gesture::{Carousel, CarouselEvent, ClickOutcome, OffsetSource};
pub use layout::{compute_geometry, geometry_for_count, CarouselGeometry};
pub use tilt::{compute_hover_tilt, compute_tilt, float_motions, FloatMotion, HoverTilt, Tilt};
