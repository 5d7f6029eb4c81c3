use vizij_stage_core::{
    carousel::compute_geometry,
    config::{CarouselConfig, Config},
    content::{parse_deck_json, CarouselItem},
    ease::Ease,
};
use vizij_test_fixtures::{configs, decks};

#[test]
fn every_deck_fixture_parses() {
    for name in decks::keys() {
        let text = decks::json(&name).unwrap();
        parse_deck_json(&text).unwrap_or_else(|e| panic!("deck {name}: {e}"));
    }
}

#[test]
fn chapters_deck_matches_its_records() {
    let items: Vec<CarouselItem> = decks::load("chapters").unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0].image, "/1.png");
    assert_eq!(items[3].title, "Chapter IV");
    assert_eq!(items[1].subtitle, "Deep Woods");
    assert_eq!(items[2].href.as_deref(), Some(""));
}

#[test]
fn single_card_deck_has_no_travel() {
    let items = parse_deck_json(&decks::json("single").unwrap()).unwrap();
    assert_eq!(items[0].subtitle, "");
    assert!(items[0].href.is_none());
    let g = compute_geometry(&items, 1000.0, &CarouselConfig::default());
    assert_eq!(g.min_offset, g.max_offset);
    assert_eq!(g.scroll_distance(), 0.0);
}

#[test]
fn config_fixtures_fill_in_defaults() {
    let default: Config = Config::from_json(&configs::json("default").unwrap()).unwrap();
    assert_eq!(default, Config::default());

    let scrubbed = Config::from_json(&configs::json("scrubbed").unwrap()).unwrap();
    assert_eq!(scrubbed.carousel.scrub, 0.5);
    assert!(!scrubbed.carousel.inertia);
    assert_eq!(scrubbed.carousel.tilt.ease, Ease::Linear);
    assert_eq!(scrubbed.carousel.max_card_size, 512.0);
    assert_eq!(scrubbed.splash.fallback_secs, 2.0);
    assert_eq!(scrubbed.transition, Config::default().transition);
    assert!(configs::description("scrubbed").unwrap().is_some());
}
