use vizij_stage_core::{
    carousel::OffsetSource,
    config::Config,
    content::parse_deck_json,
    inputs::{InputEvent, Inputs},
    outputs::StageEvent,
    surface::{ElementKind, Prop, Viewport},
    transition::{Method, Screen},
    Stage,
};
use vizij_test_fixtures::decks;

const DT: f32 = 1.0 / 60.0;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn run(stage: &mut Stage, secs: f32) -> Vec<StageEvent> {
    let steps = (secs / DT).ceil() as usize;
    let mut events = Vec::new();
    for _ in 0..steps {
        events.extend(stage.update(DT, &Inputs::default()).events.iter().cloned());
    }
    events
}

fn send(stage: &mut Stage, event: InputEvent) -> Vec<StageEvent> {
    stage.update(DT, &Inputs::new().with(event)).events.clone()
}

fn chapters_stage_with(cfg: Config, width: f32) -> Stage {
    let items = parse_deck_json(&decks::json("chapters").expect("chapters deck")).expect("valid deck");
    let mut stage = Stage::new(cfg, Viewport::new(width, 800.0), items);
    let _ = stage.navigate(Screen::Chapters, Method::Bubble);
    run(&mut stage, 1.2);
    assert_eq!(stage.screen(), Screen::Chapters);
    stage
}

fn chapters_stage(width: f32) -> Stage {
    chapters_stage_with(Config::default(), width)
}

fn offset(stage: &Stage) -> f32 {
    stage.carousel().expect("carousel mounted").offset()
}

#[test]
fn mounts_first_card_centered() {
    let stage = chapters_stage(1000.0);
    let c = stage.carousel().unwrap();
    assert_eq!(c.items().len(), 4);
    assert_eq!(c.centered_index(), 0);
    assert_eq!(c.offset(), 244.0);
    let track = c.track();
    assert_eq!(stage.surface().prop(track, Prop::X), 244.0);
    assert_eq!(stage.surface().prop(track, Prop::Width), 2198.0);
    let card = c.card_element(3).unwrap();
    assert_eq!(stage.surface().prop(card, Prop::Width), 512.0);
}

#[test]
fn clicking_card_snaps_it_to_center() {
    let mut stage = chapters_stage(1000.0);
    send(&mut stage, InputEvent::CardClick { index: 2 });
    assert!(stage.carousel().unwrap().is_snapping());

    let events = run(&mut stage, 0.7);
    let c = stage.carousel().unwrap();
    assert!(!c.is_snapping());
    assert_eq!(c.centered_index(), 2);
    assert_eq!(c.offset(), -880.0);
    assert_eq!(c.offset(), c.geometry().centering_offset(2));
    assert_eq!(c.last_source(), OffsetSource::Snap);
    assert_eq!(c.draggable().value(), -880.0);
    assert!(events.contains(&StageEvent::CenteredIndexChanged { index: 2 }));
    approx(c.tilts()[2].rotation, 0.0, 1e-4);
}

#[test]
fn clicking_centered_card_navigates_to_detail() {
    let mut stage = chapters_stage(1000.0);
    let events = send(&mut stage, InputEvent::CardClick { index: 0 });
    assert!(events.contains(&StageEvent::CardActivated { index: 0 }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, StageEvent::CenteredIndexChanged { .. })));
    assert!(events.contains(&StageEvent::ScreenChanged {
        from: Screen::Chapters,
        to: Screen::Detail
    }));
    assert_eq!(stage.screen(), Screen::Detail);
}

#[test]
fn clicks_during_snap_are_ignored() {
    let mut stage = chapters_stage(1000.0);
    send(&mut stage, InputEvent::CardClick { index: 2 });
    run(&mut stage, 0.1);
    send(&mut stage, InputEvent::CardClick { index: 3 });
    send(&mut stage, InputEvent::CardClick { index: 9 });
    run(&mut stage, 0.7);
    assert_eq!(stage.carousel().unwrap().centered_index(), 2);
}

#[test]
fn out_of_range_click_changes_nothing() {
    let mut stage = chapters_stage(1000.0);
    let events = send(&mut stage, InputEvent::CardClick { index: 4 });
    assert!(events.is_empty());
    assert!(!stage.carousel().unwrap().is_snapping());
    assert_eq!(stage.screen(), Screen::Chapters);
}

#[test]
fn slow_drag_settles_where_released() {
    let mut stage = chapters_stage(1000.0);
    send(&mut stage, InputEvent::PointerDown { x: 500.0, y: 400.0 });
    send(&mut stage, InputEvent::PointerMove { x: 400.0, y: 400.0 });
    assert_eq!(offset(&stage), 144.0);
    assert_eq!(stage.carousel().unwrap().last_source(), OffsetSource::Drag);

    // Hold still with no move events before letting go.
    run(&mut stage, 0.2);
    let events = stage
        .update(
            DT,
            &Inputs::new()
                .with(InputEvent::PointerUp { x: 400.0, y: 400.0 })
                .with(InputEvent::CardClick { index: 1 }),
        )
        .events
        .clone();
    assert!(!stage.carousel().unwrap().draggable().is_throwing());
    // The click that ends a drag does not activate or snap.
    assert!(!events
        .iter()
        .any(|e| matches!(e, StageEvent::CardActivated { .. })));
    assert!(!stage.carousel().unwrap().is_snapping());
    run(&mut stage, 0.5);
    assert_eq!(offset(&stage), 144.0);
}

#[test]
fn release_off_card_does_not_swallow_the_next_click() {
    let mut stage = chapters_stage(1000.0);
    send(&mut stage, InputEvent::PointerDown { x: 500.0, y: 400.0 });
    send(&mut stage, InputEvent::PointerMove { x: 480.0, y: 400.0 });
    run(&mut stage, 0.2);
    send(&mut stage, InputEvent::PointerLeave);
    run(&mut stage, 0.1);
    assert!(!stage.carousel().unwrap().draggable().is_throwing());

    send(&mut stage, InputEvent::CardClick { index: 1 });
    assert!(stage.carousel().unwrap().is_snapping());
    run(&mut stage, 1.5);
    assert_eq!(stage.carousel().unwrap().centered_index(), 1);
}

#[test]
fn drag_past_the_edge_is_resisted_and_clamped() {
    let mut stage = chapters_stage(1000.0);
    send(&mut stage, InputEvent::PointerDown { x: 500.0, y: 400.0 });
    send(&mut stage, InputEvent::PointerMove { x: 700.0, y: 400.0 });
    let c = stage.carousel().unwrap();
    assert_eq!(c.offset(), c.geometry().max_offset);
    let raw = c.draggable().value();
    assert!(raw > 244.0 && raw < 444.0, "resisted value {raw}");
    send(&mut stage, InputEvent::PointerLeave);
    run(&mut stage, 1.0);
    assert_eq!(offset(&stage), 244.0);
}

#[test]
fn fast_drag_throws_and_settles_in_bounds() {
    let mut stage = chapters_stage(1000.0);
    send(&mut stage, InputEvent::PointerDown { x: 600.0, y: 400.0 });
    let mut x = 600.0;
    for _ in 0..4 {
        x -= 40.0;
        send(&mut stage, InputEvent::PointerMove { x, y: 400.0 });
    }
    let released_at = offset(&stage);
    send(&mut stage, InputEvent::PointerUp { x, y: 400.0 });
    assert!(stage.carousel().unwrap().draggable().is_throwing());

    run(&mut stage, 3.0);
    let c = stage.carousel().unwrap();
    assert!(!c.draggable().is_throwing());
    assert!(c.offset() < released_at - 100.0);
    assert!(c.offset() >= c.geometry().min_offset);
    assert_eq!(c.last_source(), OffsetSource::Throw);
}

#[test]
fn throw_disabled_without_inertia() {
    let mut cfg = Config::default();
    cfg.carousel.inertia = false;
    let mut stage = chapters_stage_with(cfg, 1000.0);
    send(&mut stage, InputEvent::PointerDown { x: 600.0, y: 400.0 });
    send(&mut stage, InputEvent::PointerMove { x: 560.0, y: 400.0 });
    send(&mut stage, InputEvent::PointerMove { x: 520.0, y: 400.0 });
    send(&mut stage, InputEvent::PointerUp { x: 520.0, y: 400.0 });
    assert!(!stage.carousel().unwrap().draggable().is_throwing());
    assert_eq!(offset(&stage), 244.0 - 80.0);
}

#[test]
fn scroll_scrubs_the_track_and_releases_the_pin() {
    let mut stage = chapters_stage(1000.0);
    assert!(stage.carousel().unwrap().is_pinned());

    send(&mut stage, InputEvent::Scroll { y: 599.0 });
    assert_eq!(offset(&stage), -599.0);
    assert_eq!(stage.carousel().unwrap().last_source(), OffsetSource::Scroll);

    let events = send(&mut stage, InputEvent::Scroll { y: 2000.0 });
    assert_eq!(offset(&stage), -1442.0);
    assert!(events.contains(&StageEvent::PinChanged { pinned: false }));
}

#[test]
fn scrubbed_scroll_converges() {
    let cfg: Config = vizij_test_fixtures::configs::load("scrubbed").expect("scrubbed config");
    let mut stage = chapters_stage_with(cfg, 1000.0);
    send(&mut stage, InputEvent::Scroll { y: 1198.0 });
    let partway = offset(&stage);
    assert!(partway < 244.0 && partway > -1442.0);
    run(&mut stage, 3.0);
    assert_eq!(offset(&stage), -1442.0);
}

#[test]
fn drag_after_scroll_starts_from_scrolled_offset() {
    let mut stage = chapters_stage(1000.0);
    send(&mut stage, InputEvent::Scroll { y: 599.0 });
    send(&mut stage, InputEvent::PointerDown { x: 500.0, y: 400.0 });
    send(&mut stage, InputEvent::PointerMove { x: 550.0, y: 400.0 });
    assert_eq!(offset(&stage), -549.0);
}

#[test]
fn resize_round_trip_restores_geometry() {
    let mut stage = chapters_stage(1000.0);
    let before = *stage.carousel().unwrap().geometry();
    send(&mut stage, InputEvent::Resize { width: 640.0, height: 900.0 });
    let narrow = *stage.carousel().unwrap().geometry();
    assert_ne!(before, narrow);
    assert_eq!(narrow.viewport_width, 640.0);
    send(&mut stage, InputEvent::Resize { width: 1000.0, height: 800.0 });
    assert_eq!(*stage.carousel().unwrap().geometry(), before);
    assert_eq!(offset(&stage), before.max_offset);
}

#[test]
fn resize_cancels_snap_and_throw() {
    let mut stage = chapters_stage(1000.0);
    send(&mut stage, InputEvent::CardClick { index: 3 });
    run(&mut stage, 0.1);
    send(&mut stage, InputEvent::Resize { width: 800.0, height: 800.0 });
    let c = stage.carousel().unwrap();
    assert!(!c.is_snapping());
    let settled = c.offset();
    assert_eq!(settled, c.geometry().max_offset);
    run(&mut stage, 1.0);
    assert_eq!(offset(&stage), settled);
    assert_eq!(stage.carousel().unwrap().centered_index(), 0);

    send(&mut stage, InputEvent::PointerDown { x: 600.0, y: 400.0 });
    send(&mut stage, InputEvent::PointerMove { x: 520.0, y: 400.0 });
    send(&mut stage, InputEvent::PointerMove { x: 440.0, y: 400.0 });
    send(&mut stage, InputEvent::PointerUp { x: 440.0, y: 400.0 });
    assert!(stage.carousel().unwrap().draggable().is_throwing());
    send(&mut stage, InputEvent::Resize { width: 1000.0, height: 800.0 });
    assert!(!stage.carousel().unwrap().draggable().is_throwing());
}

#[test]
fn hover_tilts_the_face_and_leave_restores_it() {
    let mut stage = chapters_stage(1000.0);
    let face = stage.carousel().unwrap().face_element(0).unwrap();
    send(
        &mut stage,
        InputEvent::CardHover {
            index: 0,
            x: 512.0,
            y: 256.0,
        },
    );
    run(&mut stage, 0.5);
    approx(stage.surface().prop(face, Prop::RotateY), 12.0, 1e-3);
    approx(stage.surface().prop(face, Prop::RotateX), 0.0, 1e-3);
    approx(stage.surface().prop(face, Prop::Scale), 1.06, 1e-4);

    send(&mut stage, InputEvent::CardLeave { index: 0 });
    run(&mut stage, 0.8);
    approx(stage.surface().prop(face, Prop::RotateY), 0.0, 1e-3);
    approx(stage.surface().prop(face, Prop::Scale), 1.0, 1e-4);
}

#[test]
fn inverted_tilt_config_is_tolerated() {
    let mut cfg = Config::default();
    cfg.carousel.min_scale = 1.2;
    cfg.carousel.max_rotation = -20.0;
    cfg.carousel.hover_max_rotation = -12.0;
    let mut stage = chapters_stage_with(cfg, 1000.0);
    let c = stage.carousel().unwrap();
    approx(c.tilts()[0].scale, 1.2, 1e-6);
    assert!(c.tilts()[1].rotation < 0.0);

    let face = c.face_element(0).unwrap();
    send(
        &mut stage,
        InputEvent::CardHover {
            index: 0,
            x: 512.0,
            y: 256.0,
        },
    );
    run(&mut stage, 0.5);
    approx(stage.surface().prop(face, Prop::RotateY), 12.0, 1e-3);
}

#[test]
fn cards_float_independently() {
    let mut stage = chapters_stage(1000.0);
    run(&mut stage, 1.0);
    let c = stage.carousel().unwrap();
    let motions = c.float_motions().to_vec();
    assert_eq!(motions.len(), 4);
    for (i, m) in motions.iter().enumerate() {
        let card = c.card_element(i).unwrap();
        let y = stage.surface().prop(card, Prop::Y);
        assert!(y >= -1e-3 && y <= m.amplitude + 1e-3, "card {i} y={y}");
    }
}

#[test]
fn leaving_chapters_unmounts_everything() {
    let mut stage = chapters_stage(1000.0);
    let _ = stage.navigate(Screen::Detail, Method::Slide);
    run(&mut stage, 1.0);
    let surface = stage.surface();
    assert!(stage.carousel().is_none());
    assert_eq!(surface.count(&ElementKind::CarouselContainer), 0);
    assert_eq!(surface.count(&ElementKind::Track), 0);
    for index in 0..4 {
        assert_eq!(surface.count(&ElementKind::Card { index }), 0);
        assert_eq!(surface.count(&ElementKind::CardFace { index }), 0);
    }
    assert_eq!(stage.driver().active_count(), 0);

    // Carousel inputs on other screens are ignored.
    let events = send(&mut stage, InputEvent::CardClick { index: 1 });
    assert!(events.is_empty());
}
