//! Card records shown by the carousel.

use serde::{Deserialize, Serialize};

use crate::error::StageError;

/// One carousel card. Immutable for the lifetime of a mounted carousel; order
/// defines the card's position on the track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselItem {
    #[serde(rename = "img", alias = "image")]
    pub image: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Link carried with the card record. The stage itself never follows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl CarouselItem {
    pub fn new(image: impl Into<String>, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            href: None,
        }
    }
}

/// Parse a JSON array of `{ img, title, subtitle, href? }` records.
pub fn parse_deck_json(text: &str) -> Result<Vec<CarouselItem>, StageError> {
    serde_json::from_str(text).map_err(StageError::Deck)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_with_optional_fields() {
        let deck = parse_deck_json(
            r#"[
                { "img": "/1.png", "title": "Chapter I", "subtitle": "The Beginning", "href": "" },
                { "image": "/2.png", "title": "Chapter II" }
            ]"#,
        )
        .unwrap();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck[0].href.as_deref(), Some(""));
        assert_eq!(deck[1].image, "/2.png");
        assert_eq!(deck[1].subtitle, "");
    }

    #[test]
    fn rejects_non_array() {
        assert!(matches!(
            parse_deck_json(r#"{ "img": "/1.png" }"#),
            Err(StageError::Deck(_))
        ));
    }
}
