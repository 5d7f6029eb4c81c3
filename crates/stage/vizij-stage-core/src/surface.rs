//! Presentation surface: a retained tree of elements with numeric properties.
//!
//! The surface is the single visual target shared by the driver, the
//! transition engine and the carousel. Every mount, removal and property write
//! is journaled as a [`SurfaceChange`]; the stage drains the journal into
//! `Outputs` each tick so hosts only apply deltas.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::ids::{ElementId, IdAllocator};
use crate::transition::Screen;

/// Animatable element property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Prop {
    X,
    Y,
    YPercent,
    Scale,
    RotateX,
    RotateY,
    Opacity,
    Width,
    Height,
    Perspective,
}

impl Prop {
    /// Value assumed for a property that was never written.
    pub fn default_value(self) -> f32 {
        match self {
            Prop::Scale | Prop::Opacity => 1.0,
            _ => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    /// Full-viewport layer hosting transient transition elements.
    TransitionLayer,
    Bubble,
    ScreenRoot { screen: Screen },
    CarouselContainer,
    Track,
    Card { index: usize },
    /// Inner face of a card; receives hover tilt.
    CardFace { index: usize },
    SplashLabel,
    SplashBar,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceChange {
    Mounted {
        element: ElementId,
        kind: ElementKind,
        parent: Option<ElementId>,
    },
    Removed {
        element: ElementId,
    },
    Prop {
        element: ElementId,
        prop: Prop,
        value: f32,
    },
}

#[derive(Debug)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub parent: Option<ElementId>,
    children: Vec<ElementId>,
    props: HashMap<Prop, f32>,
}

impl Element {
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

#[derive(Debug)]
pub struct Surface {
    ids: IdAllocator,
    viewport: Viewport,
    elements: HashMap<ElementId, Element>,
    transition_layer: Option<ElementId>,
    journal: Vec<SurfaceChange>,
}

impl Surface {
    /// Bare surface without a transition layer. Bubble transitions on such a
    /// surface degrade to instant swaps.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            ids: IdAllocator::new(),
            viewport,
            elements: HashMap::new(),
            transition_layer: None,
            journal: Vec::new(),
        }
    }

    pub fn with_transition_layer(viewport: Viewport) -> Self {
        let mut surface = Self::new(viewport);
        let layer = surface.create(ElementKind::TransitionLayer, None);
        surface.transition_layer = Some(layer);
        surface
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn transition_layer(&self) -> Option<ElementId> {
        self.transition_layer.filter(|id| self.elements.contains_key(id))
    }

    /// Mount a new element. A parent that no longer exists is treated as none.
    pub fn create(&mut self, kind: ElementKind, parent: Option<ElementId>) -> ElementId {
        let id = self.ids.alloc_element();
        let parent = parent.filter(|p| self.elements.contains_key(p));
        if let Some(p) = parent.and_then(|p| self.elements.get_mut(&p)) {
            p.children.push(id);
        }
        self.elements.insert(
            id,
            Element {
                id,
                kind: kind.clone(),
                parent,
                children: Vec::new(),
                props: HashMap::new(),
            },
        );
        self.journal.push(SurfaceChange::Mounted {
            element: id,
            kind,
            parent,
        });
        id
    }

    /// Remove an element and its whole subtree. Returns false if it was already gone.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(parent) = self.elements.get(&id).map(|e| e.parent) else {
            return false;
        };
        if let Some(p) = parent.and_then(|p| self.elements.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(el) = self.elements.remove(&next) {
                stack.extend(el.children.iter().copied());
                self.journal.push(SurfaceChange::Removed { element: next });
            }
        }
        if self.transition_layer == Some(id) {
            self.transition_layer = None;
        }
        true
    }

    /// Remove every child of `id`, keeping `id` itself.
    pub fn clear_children(&mut self, id: ElementId) -> usize {
        let children = match self.elements.get(&id) {
            Some(el) => el.children.clone(),
            None => return 0,
        };
        for child in &children {
            self.remove(*child);
        }
        children.len()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(&id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// Current value of a property, or `None` if the element does not exist.
    pub fn get(&self, id: ElementId, prop: Prop) -> Option<f32> {
        self.elements
            .get(&id)
            .map(|e| e.props.get(&prop).copied().unwrap_or(prop.default_value()))
    }

    /// Current value of a property, falling back to its default for missing elements.
    pub fn prop(&self, id: ElementId, prop: Prop) -> f32 {
        self.get(id, prop).unwrap_or(prop.default_value())
    }

    /// Write a property. Unchanged values are not journaled. Returns false for missing elements.
    pub fn set(&mut self, id: ElementId, prop: Prop, value: f32) -> bool {
        let Some(el) = self.elements.get_mut(&id) else {
            return false;
        };
        let previous = el.props.insert(prop, value);
        if previous != Some(value) {
            self.journal.push(SurfaceChange::Prop {
                element: id,
                prop,
                value,
            });
        }
        true
    }

    pub fn find(&self, kind: &ElementKind) -> Option<ElementId> {
        let mut hits: Vec<ElementId> = self
            .elements
            .values()
            .filter(|e| &e.kind == kind)
            .map(|e| e.id)
            .collect();
        hits.sort();
        hits.first().copied()
    }

    /// Number of mounted elements of a kind.
    pub fn count(&self, kind: &ElementKind) -> usize {
        self.elements.values().filter(|e| &e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn drain_changes(&mut self) -> Vec<SurfaceChange> {
        std::mem::take(&mut self.journal)
    }
}
