//! Element tree the drag engine operates on.
//!
//! The host mirrors its own element tree into a [`Document`]: structure,
//! classes, attributes and layout rectangles. The document provides the
//! primitives the engine needs from a browser-like environment: geometry
//! queries, pointer capture, listener bookkeeping and a child-list change
//! journal.

mod element;
mod mutation;
mod selector;

pub use element::{Element, Position, Style};
pub use mutation::{MutationRecord, ObserverId};
pub use selector::{Selector, SelectorError};

use crate::geometry::Axis;
use crate::pointer::{PointerEventKind, PointerId};
use kurbo::{Point, Rect, Size, Vec2};
use mutation::Observer;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Stable identity of an element.
pub type ElementId = Uuid;

/// Identity of whoever registered a listener.
pub type OwnerId = Uuid;

/// Document errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),
    #[error("Element is not attached: {0}")]
    Detached(ElementId),
    #[error("Cannot insert {0} inside itself")]
    HierarchyCycle(ElementId),
    #[error("The document root cannot be removed")]
    RootRemoval,
}

/// Result type for document operations.
pub type DomResult<T> = Result<T, DomError>;

/// A pointer listener bound to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub kind: PointerEventKind,
    pub owner: OwnerId,
}

/// Arena-backed element tree.
#[derive(Debug, Clone)]
pub struct Document {
    root: ElementId,
    elements: HashMap<ElementId, Element>,
    observers: HashMap<ObserverId, Observer>,
    next_observer: u64,
    /// Pointer id to the element holding its capture.
    captures: HashMap<PointerId, ElementId>,
    /// Captures taken away without a terminating event, not yet delivered.
    lost_captures: Vec<(ElementId, PointerId)>,
    listeners: HashMap<ElementId, Vec<Listener>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only a `body` root.
    pub fn new() -> Self {
        let root = Element::new("body");
        let id = root.id;
        let mut elements = HashMap::new();
        elements.insert(id, root);
        Self {
            root: id,
            elements,
            observers: HashMap::new(),
            next_observer: 0,
            captures: HashMap::new(),
            lost_captures: Vec::new(),
            listeners: HashMap::new(),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn element(&self, id: ElementId) -> DomResult<&Element> {
        self.elements.get(&id).ok_or(DomError::UnknownElement(id))
    }

    pub fn element_mut(&mut self, id: ElementId) -> DomResult<&mut Element> {
        self.elements.get_mut(&id).ok_or(DomError::UnknownElement(id))
    }

    /// Whether the id is still in the arena (attached or not).
    pub fn exists(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Number of elements in the arena, including detached ones.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let element = Element::new(tag);
        let id = element.id;
        self.elements.insert(id, element);
        id
    }

    /// Create an element with a layout rect and append it to `parent`.
    pub fn create_child(&mut self, parent: ElementId, tag: &str, rect: Rect) -> DomResult<ElementId> {
        self.element(parent)?;
        let id = self.create_element(tag);
        self.element_mut(id)?.rect = rect;
        self.append_child(parent, id)?;
        Ok(id)
    }

    // --- Tree queries ---

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: ElementId) -> DomResult<&[ElementId]> {
        Ok(self.element(id)?.children())
    }

    fn index_in_parent(&self, id: ElementId) -> Option<(ElementId, usize)> {
        let parent = self.parent(id)?;
        let index = self.elements.get(&parent)?.children.iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.elements.get(&parent)?.children.get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: ElementId) -> Option<ElementId> {
        let (parent, index) = self.index_in_parent(id)?;
        let index = index.checked_sub(1)?;
        self.elements.get(&parent)?.children.get(index).copied()
    }

    /// Inclusive descendant check.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether the element is reachable from the document root.
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.exists(id) && self.contains(self.root, id)
    }

    /// All descendants of `root` in document order, excluding `root`.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.elements.get(&root) {
            Some(element) => element.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(element) = self.elements.get(&id) {
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    /// Descendants of `root` matching `selector`, in document order.
    pub fn query_selector_all(&self, root: ElementId, selector: &Selector) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.elements.get(id).is_some_and(|e| selector.matches(e)))
            .collect()
    }

    // --- Tree mutation ---

    fn check_insert(&self, parent: ElementId, node: ElementId) -> DomResult<()> {
        self.element(parent)?;
        self.element(node)?;
        if self.contains(node, parent) {
            return Err(DomError::HierarchyCycle(node));
        }
        Ok(())
    }

    fn detach(&mut self, id: ElementId) -> DomResult<()> {
        let Some(parent) = self.element(id)?.parent else {
            return Ok(());
        };
        if let Some(p) = self.elements.get_mut(&parent) {
            p.children.retain(|&c| c != id);
        }
        self.element_mut(id)?.parent = None;
        self.record(parent, Vec::new(), vec![id]);
        Ok(())
    }

    fn attach_at(&mut self, parent: ElementId, index: Option<usize>, node: ElementId) -> DomResult<()> {
        let p = self.element_mut(parent)?;
        match index {
            Some(i) => {
                let i = i.min(p.children.len());
                p.children.insert(i, node);
            }
            None => p.children.push(node),
        }
        self.element_mut(node)?.parent = Some(parent);
        self.record(parent, vec![node], Vec::new());
        Ok(())
    }

    /// Append `node` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: ElementId, node: ElementId) -> DomResult<()> {
        self.check_insert(parent, node)?;
        self.detach(node)?;
        self.attach_at(parent, None, node)
    }

    /// Insert `node` right before `reference`.
    pub fn insert_before(&mut self, reference: ElementId, node: ElementId) -> DomResult<()> {
        self.insert_relative(reference, node, 0)
    }

    /// Insert `node` right after `reference`.
    pub fn insert_after(&mut self, reference: ElementId, node: ElementId) -> DomResult<()> {
        self.insert_relative(reference, node, 1)
    }

    fn insert_relative(&mut self, reference: ElementId, node: ElementId, shift: usize) -> DomResult<()> {
        if reference == node {
            self.element(node)?;
            return Ok(());
        }
        let parent = self.element(reference)?.parent.ok_or(DomError::Detached(reference))?;
        self.check_insert(parent, node)?;
        self.detach(node)?;
        let (_, index) = self.index_in_parent(reference).ok_or(DomError::Detached(reference))?;
        self.attach_at(parent, Some(index + shift), node)
    }

    /// Detach an element (and its subtree) from its parent.
    ///
    /// The subtree stays in the arena and can be re-inserted. Pointer
    /// captures held inside it are revoked.
    pub fn remove(&mut self, id: ElementId) -> DomResult<()> {
        if id == self.root {
            return Err(DomError::RootRemoval);
        }
        self.detach(id)?;
        self.revoke_disconnected_captures();
        Ok(())
    }

    /// Remove an element and its subtree from the arena, dropping their
    /// listeners.
    pub fn destroy(&mut self, id: ElementId) -> DomResult<()> {
        if id == self.root {
            return Err(DomError::RootRemoval);
        }
        self.detach(id)?;
        self.revoke_disconnected_captures();

        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in doomed {
            self.elements.remove(&node);
            self.listeners.remove(&node);
        }
        self.observers.retain(|_, o| self.elements.contains_key(&o.root));
        Ok(())
    }

    /// Copy an element under a new id. Listeners are not copied.
    pub fn clone_node(&mut self, id: ElementId, deep: bool) -> DomResult<ElementId> {
        let copy = self.element(id)?.shallow_clone();
        let copy_id = copy.id;
        self.elements.insert(copy_id, copy);
        if deep {
            let children = self.element(id)?.children.clone();
            for child in children {
                let child_copy = self.clone_node(child, true)?;
                self.element_mut(child_copy)?.parent = Some(copy_id);
                self.element_mut(copy_id)?.children.push(child_copy);
            }
        }
        Ok(copy_id)
    }

    // --- Attributes, classes and style ---

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)?.set_attribute(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> DomResult<()> {
        self.element_mut(id)?.remove_attribute(name);
        Ok(())
    }

    /// `false` for unknown elements.
    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.elements.get(&id).is_some_and(|e| e.has_attribute(name))
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) -> DomResult<()> {
        self.element_mut(id)?.add_class(class);
        Ok(())
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) -> DomResult<()> {
        self.element_mut(id)?.remove_class(class);
        Ok(())
    }

    /// `false` for unknown elements.
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements.get(&id).is_some_and(|e| e.has_class(class))
    }

    pub fn style_mut(&mut self, id: ElementId) -> DomResult<&mut Style> {
        Ok(&mut self.element_mut(id)?.style)
    }

    // --- Geometry ---

    /// Store the layout rect computed by the host.
    pub fn set_rect(&mut self, id: ElementId, rect: Rect) -> DomResult<()> {
        self.element_mut(id)?.rect = rect;
        Ok(())
    }

    /// On-screen rectangle of an element.
    ///
    /// Fixed elements are placed by their style, absolute ones relative to
    /// their parent's origin, static ones by their layout rect.
    pub fn bounding_rect(&self, id: ElementId) -> DomResult<Rect> {
        let element = self.element(id)?;
        let style = &element.style;
        let layout = element.rect;
        let size = Size::new(
            style.width.unwrap_or(layout.width()),
            style.height.unwrap_or(layout.height()),
        );
        Ok(match style.position {
            Position::Static => layout,
            Position::Fixed => Rect::from_origin_size(
                Point::new(style.left.unwrap_or(layout.x0), style.top.unwrap_or(layout.y0)),
                size,
            ),
            Position::Absolute => {
                let origin = match element.parent {
                    Some(parent) => self.bounding_rect(parent)?.origin(),
                    None => Point::ZERO,
                };
                let offset = Vec2::new(style.left.unwrap_or(0.0), style.top.unwrap_or(0.0));
                Rect::from_origin_size(origin + offset, size)
            }
        })
    }

    /// Lay out the static, visible children of `parent` one after another
    /// along `axis`, keeping each child's size.
    pub fn stack_children(&mut self, parent: ElementId, axis: Axis, gap: f64) -> DomResult<()> {
        let mut cursor = self.bounding_rect(parent)?.origin();
        let children = self.element(parent)?.children.clone();
        for child in children {
            let element = self.element_mut(child)?;
            if element.style.position != Position::Static || element.style.hidden {
                continue;
            }
            let size = element.rect.size();
            element.rect = Rect::from_origin_size(cursor, size);
            match axis {
                Axis::Horizontal => cursor.x += size.width + gap,
                Axis::Vertical => cursor.y += size.height + gap,
            }
        }
        Ok(())
    }

    /// Deepest, topmost visible element under `point`.
    pub fn hit_test(&self, point: Point) -> Option<ElementId> {
        self.hit_test_from(self.root, point)
    }

    fn hit_test_from(&self, id: ElementId, point: Point) -> Option<ElementId> {
        let element = self.elements.get(&id)?;
        if element.style.hidden {
            return None;
        }
        for &child in element.children.iter().rev() {
            if let Some(hit) = self.hit_test_from(child, point) {
                return Some(hit);
            }
        }
        let rect = self.bounding_rect(id).ok()?;
        rect.contains(point).then_some(id)
    }

    // --- Mutation journal ---

    /// Start recording child-list changes anywhere under `root`.
    pub fn observe(&mut self, root: ElementId) -> DomResult<ObserverId> {
        self.element(root)?;
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.insert(id, Observer::new(root));
        Ok(id)
    }

    /// Stop recording and drop pending records.
    pub fn disconnect(&mut self, observer: ObserverId) {
        self.observers.remove(&observer);
    }

    /// Drain pending records for an observer.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(&observer)
            .map(|o| std::mem::take(&mut o.records))
            .unwrap_or_default()
    }

    pub fn has_records(&self, observer: ObserverId) -> bool {
        self.observers.get(&observer).is_some_and(|o| !o.records.is_empty())
    }

    fn record(&mut self, target: ElementId, added: Vec<ElementId>, removed: Vec<ElementId>) {
        let interested: Vec<ObserverId> = self
            .observers
            .iter()
            .filter(|(_, o)| self.contains(o.root, target))
            .map(|(&id, _)| id)
            .collect();
        for id in interested {
            if let Some(observer) = self.observers.get_mut(&id) {
                observer.records.push(MutationRecord {
                    target,
                    added: added.clone(),
                    removed: removed.clone(),
                });
            }
        }
    }

    // --- Pointer capture ---

    /// Route all further events of `pointer` to `id`.
    pub fn set_pointer_capture(&mut self, id: ElementId, pointer: PointerId) -> DomResult<()> {
        if !self.is_connected(id) {
            return Err(DomError::Detached(id));
        }
        if let Some(previous) = self.captures.insert(pointer, id) {
            if previous != id {
                self.lost_captures.push((previous, pointer));
            }
        }
        Ok(())
    }

    pub fn has_pointer_capture(&self, id: ElementId, pointer: PointerId) -> bool {
        self.captures.get(&pointer) == Some(&id)
    }

    /// Release capture held by `id`. Does not produce a lost-capture event.
    pub fn release_pointer_capture(&mut self, id: ElementId, pointer: PointerId) {
        if self.has_pointer_capture(id, pointer) {
            self.captures.remove(&pointer);
        }
    }

    pub fn capture_target(&self, pointer: PointerId) -> Option<ElementId> {
        self.captures.get(&pointer).copied()
    }

    /// Take capture away without a terminating event.
    ///
    /// Returns the element that lost it; the loss is queued for delivery.
    pub fn revoke_pointer_capture(&mut self, pointer: PointerId) -> Option<ElementId> {
        let target = self.captures.remove(&pointer)?;
        self.lost_captures.push((target, pointer));
        Some(target)
    }

    /// Drain queued capture losses.
    pub fn take_lost_captures(&mut self) -> Vec<(ElementId, PointerId)> {
        std::mem::take(&mut self.lost_captures)
    }

    fn revoke_disconnected_captures(&mut self) {
        let mut lost: Vec<(PointerId, ElementId)> = self
            .captures
            .iter()
            .filter(|&(_, &target)| !self.is_connected(target))
            .map(|(&pointer, &target)| (pointer, target))
            .collect();
        lost.sort_by_key(|&(pointer, _)| pointer);
        for (pointer, target) in lost {
            self.captures.remove(&pointer);
            self.lost_captures.push((target, pointer));
        }
    }

    // --- Listeners ---

    /// Bind a listener. Binding the same `(kind, owner)` twice is a no-op.
    pub fn add_listener(&mut self, id: ElementId, kind: PointerEventKind, owner: OwnerId) -> DomResult<()> {
        self.element(id)?;
        let listener = Listener { kind, owner };
        let list = self.listeners.entry(id).or_default();
        if !list.contains(&listener) {
            list.push(listener);
        }
        Ok(())
    }

    /// Remove every listener `owner` bound on `id`.
    pub fn remove_listeners(&mut self, id: ElementId, owner: OwnerId) {
        if let Some(list) = self.listeners.get_mut(&id) {
            list.retain(|l| l.owner != owner);
            if list.is_empty() {
                self.listeners.remove(&id);
            }
        }
    }

    /// Remove every listener `owner` bound anywhere.
    pub fn remove_owner(&mut self, owner: OwnerId) {
        self.listeners.retain(|_, list| {
            list.retain(|l| l.owner != owner);
            !list.is_empty()
        });
    }

    pub fn listener_count(&self, id: ElementId, kind: PointerEventKind) -> usize {
        self.listeners
            .get(&id)
            .map_or(0, |list| list.iter().filter(|l| l.kind == kind).count())
    }

    /// Owners listening for `kind` on `id`, in binding order.
    pub fn listeners_on(&self, id: ElementId, kind: PointerEventKind) -> Vec<OwnerId> {
        self.listeners
            .get(&id)
            .map(|list| list.iter().filter(|l| l.kind == kind).map(|l| l.owner).collect())
            .unwrap_or_default()
    }
}
