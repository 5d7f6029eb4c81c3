//! Carousel interaction: track offset with drag, throw, scroll and snap producers.
//!
//! The track offset is one authoritative value. Every producer goes through
//! `write_offset`, which clamps to the current geometry, writes the track's `x`
//! and re-runs tilt for all cards. Producers do not exclude each other; the
//! most recent write wins.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::layout::{compute_geometry, CarouselGeometry};
use super::tilt::{compute_hover_tilt, compute_tilt, float_motions, FloatMotion, HoverTilt, Tilt};
use crate::config::CarouselConfig;
use crate::content::CarouselItem;
use crate::drag::{DragBounds, DragRelease, DragSpec, Draggable};
use crate::driver::{Driver, Repeat, TweenEvent, TweenOpts};
use crate::ease::Ease;
use crate::ids::{ElementId, TweenId};
use crate::scroll::{ScrollBinding, ScrollSpec};
use crate::surface::{ElementKind, Prop, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickOutcome {
    /// The clicked card was already centered.
    Activate(usize),
    /// A snap toward the clicked card started.
    Snapping(usize),
    /// Click dropped: a snap is running, it ended a drag, or the index is out of range.
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetSource {
    Layout,
    Drag,
    Throw,
    Scroll,
    Snap,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CarouselEvent {
    CenteredIndexChanged { index: usize },
    PinChanged { pinned: bool },
}

#[derive(Debug, Clone, Copy)]
struct CardElements {
    card: ElementId,
    face: ElementId,
}

#[derive(Debug, Clone, Copy)]
struct Snap {
    tween: TweenId,
    index: usize,
}

#[derive(Debug)]
pub struct Carousel {
    cfg: CarouselConfig,
    items: Vec<CarouselItem>,
    geometry: CarouselGeometry,
    offset: f32,
    last_source: OffsetSource,
    centered_index: usize,

    container: ElementId,
    track: ElementId,
    cards: Vec<CardElements>,
    floats: Vec<FloatMotion>,
    tilts: Vec<Tilt>,

    scroll: ScrollBinding,
    drag: Draggable,
    snap: Option<Snap>,
    pinned: bool,
    suppress_click: bool,

    events: Vec<CarouselEvent>,
}

impl Carousel {
    /// Build the carousel elements under `parent` and lay them out for the surface viewport.
    pub fn mount(
        parent: Option<ElementId>,
        items: Vec<CarouselItem>,
        cfg: &CarouselConfig,
        driver: &mut Driver,
        surface: &mut Surface,
    ) -> Self {
        let viewport = surface.viewport();
        let geometry = compute_geometry(&items, viewport.width, cfg);

        let container = surface.create(ElementKind::CarouselContainer, parent);
        let track = surface.create(ElementKind::Track, Some(container));
        let cards: Vec<CardElements> = (0..items.len())
            .map(|index| {
                let card = surface.create(ElementKind::Card { index }, Some(track));
                let face = surface.create(ElementKind::CardFace { index }, Some(card));
                CardElements { card, face }
            })
            .collect();

        let scroll_spec = scroll_spec_for(&geometry, cfg);
        let scroll = ScrollBinding::new(scroll_spec, 0.0);
        let drag = Draggable::new(drag_spec_for(&geometry, cfg), scroll.value());

        let floats = float_motions(items.len(), cfg, cfg.float_seed);
        let mut carousel = Self {
            cfg: cfg.clone(),
            items,
            geometry,
            offset: geometry.max_offset,
            last_source: OffsetSource::Layout,
            centered_index: 0,
            container,
            track,
            cards,
            floats,
            tilts: Vec::new(),
            pinned: scroll.is_pinned(),
            scroll,
            drag,
            snap: None,
            suppress_click: false,
            events: Vec::new(),
        };

        carousel.size_cards(driver, surface);
        for (c, m) in carousel.cards.iter().zip(carousel.floats.iter()) {
            driver.to(
                surface,
                c.card,
                &[(Prop::Y, m.amplitude)],
                TweenOpts::new(m.period, Ease::SineInOut)
                    .with_repeat(Repeat::Infinite)
                    .with_yoyo(true)
                    .with_delay(m.delay)
                    .keep_existing(),
            );
        }
        let start = carousel.scroll.value();
        carousel.write_offset(start, OffsetSource::Layout, driver, surface);
        debug!(
            "carousel mounted: {} cards, card={} gap={} bounds=[{}, {}]",
            carousel.items.len(),
            geometry.card_width,
            geometry.gap,
            geometry.min_offset,
            geometry.max_offset
        );
        carousel
    }

    fn size_cards(&mut self, driver: &mut Driver, surface: &mut Surface) {
        let g = self.geometry;
        driver.set(surface, self.container, &[(Prop::Width, g.viewport_width)]);
        driver.set(surface, self.track, &[(Prop::Width, g.total_extent)]);
        for c in &self.cards {
            driver.set(
                surface,
                c.card,
                &[
                    (Prop::Width, g.card_width),
                    (Prop::Height, g.card_height),
                    (Prop::Perspective, self.cfg.perspective),
                ],
            );
            driver.set(
                surface,
                c.face,
                &[
                    (Prop::Width, g.card_width),
                    (Prop::Height, g.card_height),
                    (Prop::Perspective, self.cfg.hover_perspective),
                ],
            );
        }
    }

    fn write_offset(
        &mut self,
        value: f32,
        source: OffsetSource,
        driver: &mut Driver,
        surface: &mut Surface,
    ) {
        self.offset = self.geometry.clamp_offset(value);
        self.last_source = source;
        surface.set(self.track, Prop::X, self.offset);
        self.apply_tilt(driver, surface);
    }

    fn apply_tilt(&mut self, driver: &mut Driver, surface: &mut Surface) {
        self.tilts.clear();
        for (index, c) in self.cards.iter().enumerate() {
            let tilt = compute_tilt(self.offset, &self.geometry, index, &self.cfg);
            let props = [(Prop::RotateY, tilt.rotation), (Prop::Scale, tilt.scale)];
            if self.cfg.tilt.duration <= 0.0 {
                driver.set(surface, c.card, &props);
            } else {
                driver.to(surface, c.card, &props, self.cfg.tilt.opts());
            }
            self.tilts.push(tilt);
        }
    }

    pub fn on_scroll(&mut self, scroll_y: f32) {
        self.scroll.on_scroll(scroll_y);
    }

    pub fn pointer_down(&mut self, x: f32, now: f32, driver: &mut Driver) {
        // Grabbing the track takes it over from a running snap.
        if let Some(snap) = self.snap.take() {
            driver.kill(snap.tween);
            debug!("snap to card {} cancelled by press", snap.index);
        }
        self.suppress_click = false;
        self.drag.update(self.offset);
        self.drag.press(x, now);
    }

    pub fn pointer_move(&mut self, x: f32, now: f32, driver: &mut Driver, surface: &mut Surface) {
        if let Some(v) = self.drag.drag(x, now) {
            self.write_offset(v, OffsetSource::Drag, driver, surface);
        }
    }

    pub fn pointer_up(&mut self, now: f32, driver: &mut Driver, surface: &mut Surface) {
        match self.drag.release(now) {
            DragRelease::Settled(v) => {
                self.suppress_click = true;
                self.write_offset(v, OffsetSource::Drag, driver, surface);
            }
            DragRelease::Thrown => self.suppress_click = true,
            DragRelease::Click | DragRelease::Idle => {}
        }
    }

    /// Click on card `index`: activate it if centered, otherwise snap it to center.
    pub fn click(&mut self, index: usize, driver: &mut Driver, surface: &Surface) -> ClickOutcome {
        if std::mem::take(&mut self.suppress_click) {
            return ClickOutcome::Ignored;
        }
        if index >= self.items.len() {
            warn!("click on card {index} outside 0..{}", self.items.len());
            return ClickOutcome::Ignored;
        }
        if self.snap.is_some() {
            debug!("click on card {index} ignored while snapping");
            return ClickOutcome::Ignored;
        }
        if index == self.centered_index {
            return ClickOutcome::Activate(index);
        }
        self.drag.cancel();
        let target = self.geometry.centering_offset(index);
        let tween = driver.to(surface, self.track, &[(Prop::X, target)], self.cfg.snap.opts());
        self.snap = Some(Snap { tween, index });
        ClickOutcome::Snapping(index)
    }

    pub fn hover(&mut self, index: usize, x: f32, y: f32, driver: &mut Driver, surface: &Surface) {
        let Some(c) = self.cards.get(index) else {
            return;
        };
        let g = self.geometry;
        let t = compute_hover_tilt(x, y, g.card_width, g.card_height, &self.cfg);
        driver.to(surface, c.face, &hover_props(t), self.cfg.hover_in.opts());
    }

    pub fn hover_end(&mut self, index: usize, driver: &mut Driver, surface: &Surface) {
        let Some(c) = self.cards.get(index) else {
            return;
        };
        driver.to(
            surface,
            c.face,
            &hover_props(HoverTilt::REST),
            self.cfg.hover_out.opts(),
        );
    }

    /// Re-derive geometry for the surface's current viewport.
    ///
    /// In-flight drag, throw and snap are cancelled first so no producer keeps
    /// writing offsets computed against the old bounds.
    pub fn resize(&mut self, driver: &mut Driver, surface: &mut Surface) {
        self.drag.cancel();
        if let Some(snap) = self.snap.take() {
            driver.kill(snap.tween);
        }
        let width = surface.viewport().width;
        self.geometry = compute_geometry(&self.items, width, &self.cfg);
        self.size_cards(driver, surface);
        let value = self.scroll.refresh(scroll_spec_for(&self.geometry, &self.cfg));
        self.drag.set_bounds(DragBounds::new(
            self.geometry.min_offset,
            self.geometry.max_offset,
        ));
        self.write_offset(value, OffsetSource::Layout, driver, surface);
        self.drag.update(self.offset);
        self.refresh_pin();
    }

    /// Feed one tick: snap progress, throw decay, scroll smoothing.
    pub fn tick(&mut self, dt: f32, events: &[TweenEvent], driver: &mut Driver, surface: &mut Surface) {
        if let Some(snap) = self.snap {
            if events.contains(&TweenEvent::Completed(snap.tween)) {
                self.snap = None;
                let v = surface.prop(self.track, Prop::X);
                self.write_offset(v, OffsetSource::Snap, driver, surface);
                self.drag.update(self.offset);
                if self.centered_index != snap.index {
                    self.centered_index = snap.index;
                    self.events
                        .push(CarouselEvent::CenteredIndexChanged { index: snap.index });
                }
            } else if events.contains(&TweenEvent::Updated(snap.tween)) {
                let v = surface.prop(self.track, Prop::X);
                self.write_offset(v, OffsetSource::Snap, driver, surface);
            } else if !driver.is_active(snap.tween) {
                debug!("snap to card {} interrupted", snap.index);
                self.snap = None;
            }
        }

        if let Some(v) = self.drag.tick(dt) {
            self.write_offset(v, OffsetSource::Throw, driver, surface);
        }

        if let Some(v) = self.scroll.tick(dt) {
            self.write_offset(v, OffsetSource::Scroll, driver, surface);
            self.drag.update(self.offset);
        }
        self.refresh_pin();
        // A release only swallows the click delivered in the same frame.
        self.suppress_click = false;
    }

    fn refresh_pin(&mut self) {
        let pinned = self.scroll.is_pinned();
        if pinned != self.pinned {
            self.pinned = pinned;
            self.events.push(CarouselEvent::PinChanged { pinned });
        }
    }

    /// Release bindings, stop every tween and remove all carousel elements.
    pub fn unmount(mut self, driver: &mut Driver, surface: &mut Surface) {
        self.scroll.kill();
        self.drag.kill();
        if let Some(snap) = self.snap.take() {
            driver.kill(snap.tween);
        }
        driver.kill_tweens_of(self.track);
        for c in &self.cards {
            driver.kill_tweens_of(c.card);
            driver.kill_tweens_of(c.face);
        }
        surface.remove(self.container);
        debug!("carousel unmounted");
    }

    pub fn drain_events(&mut self) -> Vec<CarouselEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn geometry(&self) -> &CarouselGeometry {
        &self.geometry
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn last_source(&self) -> OffsetSource {
        self.last_source
    }

    pub fn centered_index(&self) -> usize {
        self.centered_index
    }

    pub fn tilts(&self) -> &[Tilt] {
        &self.tilts
    }

    pub fn float_motions(&self) -> &[FloatMotion] {
        &self.floats
    }

    pub fn items(&self) -> &[CarouselItem] {
        &self.items
    }

    pub fn is_snapping(&self) -> bool {
        self.snap.is_some()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn track(&self) -> ElementId {
        self.track
    }

    pub fn card_element(&self, index: usize) -> Option<ElementId> {
        self.cards.get(index).map(|c| c.card)
    }

    pub fn face_element(&self, index: usize) -> Option<ElementId> {
        self.cards.get(index).map(|c| c.face)
    }

    pub fn draggable(&self) -> &Draggable {
        &self.drag
    }

    pub fn scroll_binding(&self) -> &ScrollBinding {
        &self.scroll
    }
}

fn hover_props(t: HoverTilt) -> [(Prop, f32); 3] {
    [
        (Prop::RotateX, t.rotate_x),
        (Prop::RotateY, t.rotate_y),
        (Prop::Scale, t.scale),
    ]
}

fn scroll_spec_for(g: &CarouselGeometry, cfg: &CarouselConfig) -> ScrollSpec {
    ScrollSpec {
        start: cfg.scroll_start,
        distance: g.scroll_distance(),
        from: g.max_offset,
        to: g.min_offset,
        scrub: cfg.scrub,
        pin: true,
    }
}

fn drag_spec_for(g: &CarouselGeometry, cfg: &CarouselConfig) -> DragSpec {
    DragSpec {
        bounds: DragBounds::new(g.min_offset, g.max_offset),
        edge_resistance: cfg.edge_resistance,
        inertia: cfg.inertia,
        throw_resistance: cfg.throw_resistance,
    }
}
