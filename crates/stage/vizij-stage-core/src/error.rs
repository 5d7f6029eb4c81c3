//! Error types for fallible stage boundaries (config, decks, names).
//!
//! Runtime degradations (dropped navigation, missing transition layer, missing
//! slide root) are not errors; they surface as [`crate::TransitionResult`] values.

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum StageError {
    /// Config JSON could not be parsed
    #[error("invalid stage config: {0}")]
    Config(#[source] serde_json::Error),

    /// Card deck JSON could not be parsed
    #[error("invalid card deck: {0}")]
    Deck(#[source] serde_json::Error),

    #[error("unknown screen: {name}")]
    UnknownScreen { name: String },

    #[error("unknown transition method: {name}")]
    UnknownMethod { name: String },
}
