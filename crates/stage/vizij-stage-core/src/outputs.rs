//! Output contracts from the stage.
//!
//! Outputs carry the surface deltas of this tick (mounts, removals, property
//! writes) and a separate list of semantic events. Adapters apply the changes
//! to their presentation layer and transport the events.

use serde::{Deserialize, Serialize};

use crate::surface::SurfaceChange;
use crate::transition::{Method, Screen, TransitionResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StageEvent {
    ScreenChanged {
        from: Screen,
        to: Screen,
    },
    /// A navigate request arrived while a transition was running.
    NavigationDropped {
        target: Screen,
        method: Method,
    },
    TransitionFinished {
        target: Screen,
        method: Method,
        result: TransitionResult,
    },
    CenteredIndexChanged {
        index: usize,
    },
    /// The centered card was clicked.
    CardActivated {
        index: usize,
    },
    SplashProgress {
        percent: u32,
    },
    PinChanged {
        pinned: bool,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    pub changes: Vec<SurfaceChange>,
    pub events: Vec<StageEvent>,
}

impl Outputs {
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    pub fn push(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }
}
