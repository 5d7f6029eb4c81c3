//! Vizij Stage Core (engine-agnostic)
//!
//! Drives a single-page stage: a screen navigator with animated bubble/slide
//! transitions and a horizontal carousel with drag, inertia, scroll coupling
//! and per-card tilt. Hosts (web/WASM, native) call [`Stage::update`] once per
//! frame with that frame's environment inputs and apply the returned
//! [`Outputs`] to their presentation layer.

pub mod carousel;
pub mod config;
pub mod content;
pub mod drag;
pub mod driver;
pub mod ease;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod outputs;
pub mod scroll;
pub mod splash;
pub mod stage;
pub mod surface;
pub mod transition;

// Re-exports for consumers (adapters)
pub use carousel::{
    compute_geometry, compute_hover_tilt, compute_tilt, Carousel, CarouselGeometry, ClickOutcome,
    HoverTilt, Tilt,
};
pub use config::{CarouselConfig, Config, Motion, SplashConfig, TransitionConfig};
pub use content::{parse_deck_json, CarouselItem};
pub use drag::{DragBounds, DragRelease, DragSpec, Draggable};
pub use driver::{Driver, Repeat, Timeline, TweenEvent, TweenOpts};
pub use ease::Ease;
pub use error::StageError;
pub use ids::{ElementId, TweenId};
pub use inputs::{InputEvent, Inputs};
pub use outputs::{Outputs, StageEvent};
pub use scroll::{ScrollBinding, ScrollSpec};
pub use splash::{Splash, SplashEvent};
pub use stage::Stage;
pub use surface::{ElementKind, Prop, Surface, SurfaceChange, Viewport};
pub use transition::{
    Completion, DegradeReason, Method, Navigation, Screen, ScreenHost, TransitionEngine,
    TransitionEvent, TransitionResult,
};
