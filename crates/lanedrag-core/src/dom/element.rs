//! Element nodes and their inline style.

use super::ElementId;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// How an element is positioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Laid out by the host; geometry comes from the layout rect.
    #[default]
    Static,
    /// Offset from the parent's origin by `left`/`top`.
    Absolute,
    /// Placed in viewport coordinates by `left`/`top`.
    Fixed,
}

/// Inline style properties the drag engine reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub position: Position,
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub z_index: Option<i32>,
    /// Removed from layout and hit-testing.
    pub hidden: bool,
}

/// A node of the document tree.
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) id: ElementId,
    tag: String,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    /// Inline style.
    pub style: Style,
    pub(crate) rect: Rect,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
}

impl Element {
    /// Create a detached element with a fresh id.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag: tag.into(),
            classes: BTreeSet::new(),
            attributes: BTreeMap::new(),
            style: Style::default(),
            rect: Rect::ZERO,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Copy of this element's own data under a new id, without tree links.
    pub(crate) fn shallow_clone(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag: self.tag.clone(),
            classes: self.classes.clone(),
            attributes: self.attributes.clone(),
            style: self.style.clone(),
            rect: self.rect,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Layout rectangle as last written by the host.
    pub fn layout_rect(&self) -> Rect {
        self.rect
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        self.classes.insert(class.into());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shallow_clone_gets_new_id() {
        let mut element = Element::new("li");
        element.add_class("card");
        element.set_attribute("data-id", "1");
        element.style.width = Some(30.0);

        let copy = element.shallow_clone();
        assert_ne!(copy.id(), element.id());
        assert!(copy.has_class("card"));
        assert_eq!(copy.attribute("data-id"), Some("1"));
        assert_eq!(copy.style, element.style);
        assert!(copy.parent().is_none());
    }

    #[test]
    fn test_attribute_and_class_toggle() {
        let mut element = Element::new("div");
        element.set_attribute("dragging", "");
        element.add_class("ghost");
        assert!(element.has_attribute("dragging"));
        assert!(element.has_class("ghost"));

        element.remove_attribute("dragging");
        element.remove_class("ghost");
        assert!(!element.has_attribute("dragging"));
        assert!(!element.has_class("ghost"));
        assert_eq!(element.classes().count(), 0);
    }
}
