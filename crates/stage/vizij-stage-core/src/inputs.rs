//! Input contracts for the stage.
//!
//! Hosts collect the environment events of one frame into [`Inputs`] and pass
//! them to `Stage::update`. Events are applied in order before any stepping.

use serde::{Deserialize, Serialize};

use crate::transition::{Method, Screen};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inputs {
    #[serde(default)]
    pub events: Vec<InputEvent>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, event: InputEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Pointer coordinates are viewport pixels; card hover coordinates are
/// relative to the card face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Resize {
        width: f32,
        height: f32,
    },
    Scroll {
        y: f32,
    },
    PointerDown {
        x: f32,
        y: f32,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp {
        x: f32,
        y: f32,
    },
    /// Pointer left the window mid-drag; treated as a release.
    PointerLeave,
    CardClick {
        index: usize,
    },
    CardHover {
        index: usize,
        x: f32,
        y: f32,
    },
    CardLeave {
        index: usize,
    },
    Navigate {
        screen: Screen,
        #[serde(default)]
        method: Method,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_method_defaults_to_bubble() {
        let inputs: Inputs =
            serde_json::from_str(r#"{"events":[{"Navigate":{"screen":"chapters"}}]}"#).unwrap();
        assert_eq!(
            inputs.events,
            vec![InputEvent::Navigate {
                screen: Screen::Chapters,
                method: Method::Bubble
            }]
        );
        let empty: Inputs = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
