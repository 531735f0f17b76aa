//! Container configuration.
//!
//! A container is configured either from JSON or from the attributes of its
//! host element (`draggable`, `into`, `lane-horizontal`,
//! `draggable-horizontal`, `ghost` and `free`).

use super::strategy::DropStrategy;
use crate::dom::{Document, DomError, DomResult, Element, ElementId, Selector, SelectorError};
use crate::geometry::Axis;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host attribute holding the draggable selector.
pub const DRAGGABLE_ATTR: &str = "draggable";
/// Host attribute holding the lane selector.
pub const INTO_ATTR: &str = "into";
/// Presence flag: lanes are compared horizontally.
pub const LANE_HORIZONTAL_ATTR: &str = "lane-horizontal";
/// Presence flag: draggables within a lane are compared horizontally.
pub const DRAGGABLE_HORIZONTAL_ATTR: &str = "draggable-horizontal";
/// `ghost="clone"` selects [`GhostMode::Clone`].
pub const GHOST_ATTR: &str = "ghost";
/// Presence flag: free positioning instead of reordering.
pub const FREE_ATTR: &str = "free";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid selector in `{attribute}`: {source}")]
    Selector {
        attribute: &'static str,
        #[source]
        source: SelectorError,
    },
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// How the drop placeholder is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GhostMode {
    /// The dragged element itself marks the drop slot.
    #[default]
    InPlace,
    /// A clone marks the drop slot while the original is hidden.
    Clone,
}

/// Settings for a drag container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Which descendants can be dragged. `None` means every direct child.
    pub draggable: Option<Selector>,
    /// Which descendants act as lanes. `None` means the host itself.
    pub into: Option<Selector>,
    /// Axis used to pick the nearest lane.
    pub lane_axis: Axis,
    /// Axis used to order draggables within a lane.
    pub draggable_axis: Axis,
    pub ghost: GhostMode,
    pub strategy: DropStrategy,
}

impl DragConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read the configuration from a host element's attributes.
    ///
    /// Empty selector attributes count as absent.
    pub fn from_attributes(element: &Element) -> Result<Self, ConfigError> {
        let selector = |attribute: &'static str| -> Result<Option<Selector>, ConfigError> {
            match element.attribute(attribute).map(str::trim) {
                None | Some("") => Ok(None),
                Some(source) => Selector::parse(source)
                    .map(Some)
                    .map_err(|source| ConfigError::Selector { attribute, source }),
            }
        };

        Ok(Self {
            draggable: selector(DRAGGABLE_ATTR)?,
            into: selector(INTO_ATTR)?,
            lane_axis: Axis::from_flag(element.has_attribute(LANE_HORIZONTAL_ATTR)),
            draggable_axis: Axis::from_flag(element.has_attribute(DRAGGABLE_HORIZONTAL_ATTR)),
            ghost: match element.attribute(GHOST_ATTR) {
                Some("clone") => GhostMode::Clone,
                _ => GhostMode::InPlace,
            },
            strategy: if element.has_attribute(FREE_ATTR) {
                DropStrategy::FreePosition
            } else {
                DropStrategy::Reorder
            },
        })
    }

    /// Whether `name` is one of the attributes read by [`Self::from_attributes`].
    pub fn is_config_attribute(name: &str) -> bool {
        matches!(
            name,
            DRAGGABLE_ATTR | INTO_ATTR | LANE_HORIZONTAL_ATTR | DRAGGABLE_HORIZONTAL_ATTR | GHOST_ATTR | FREE_ATTR
        )
    }

    pub fn with_draggable(mut self, selector: Selector) -> Self {
        self.draggable = Some(selector);
        self
    }

    pub fn with_lanes(mut self, selector: Selector) -> Self {
        self.into = Some(selector);
        self
    }

    pub fn horizontal_lanes(mut self) -> Self {
        self.lane_axis = Axis::Horizontal;
        self
    }

    pub fn horizontal_draggables(mut self) -> Self {
        self.draggable_axis = Axis::Horizontal;
        self
    }

    pub fn with_ghost(mut self, ghost: GhostMode) -> Self {
        self.ghost = ghost;
        self
    }

    pub fn free_position(mut self) -> Self {
        self.strategy = DropStrategy::FreePosition;
        self
    }

    /// Ghost mode actually used; free positioning always marks in place.
    pub fn effective_ghost(&self) -> GhostMode {
        match self.strategy {
            DropStrategy::FreePosition => GhostMode::InPlace,
            DropStrategy::Reorder => self.ghost,
        }
    }

    /// Lanes under `host`, or the host itself.
    pub fn lanes(&self, doc: &Document, host: ElementId) -> Vec<ElementId> {
        match &self.into {
            Some(selector) => doc.query_selector_all(host, selector),
            None => vec![host],
        }
    }

    /// Draggables anywhere under `host`.
    pub fn draggables(&self, doc: &Document, host: ElementId) -> DomResult<Vec<ElementId>> {
        self.draggables_in(doc, host)
    }

    /// Draggables under `scope`: selector matches, or direct children.
    pub fn draggables_in(&self, doc: &Document, scope: ElementId) -> DomResult<Vec<ElementId>> {
        match &self.draggable {
            Some(selector) => Ok(doc.query_selector_all(scope, selector)),
            None => Ok(doc.children(scope)?.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    #[test]
    fn test_defaults() {
        let config = DragConfig::new();
        assert!(config.draggable.is_none());
        assert!(config.into.is_none());
        assert_eq!(config.lane_axis, Axis::Vertical);
        assert_eq!(config.draggable_axis, Axis::Vertical);
        assert_eq!(config.ghost, GhostMode::InPlace);
        assert_eq!(config.strategy, DropStrategy::Reorder);
    }

    #[test]
    fn test_from_json_partial() {
        let config = DragConfig::from_json(
            r#"{"draggable": ".card", "into": ".lane", "lane_axis": "horizontal", "ghost": "clone"}"#,
        )
        .unwrap();
        assert_eq!(config.draggable.as_ref().map(Selector::as_str), Some(".card"));
        assert_eq!(config.into.as_ref().map(Selector::as_str), Some(".lane"));
        assert_eq!(config.lane_axis, Axis::Horizontal);
        assert_eq!(config.draggable_axis, Axis::Vertical);
        assert_eq!(config.ghost, GhostMode::Clone);
    }

    #[test]
    fn test_from_json_rejects_bad_selector() {
        let err = DragConfig::from_json(r#"{"draggable": "ul li"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_from_attributes() {
        let mut host = Element::new("draggable-div");
        host.set_attribute(DRAGGABLE_ATTR, ".card");
        host.set_attribute(INTO_ATTR, "");
        host.set_attribute(LANE_HORIZONTAL_ATTR, "");
        host.set_attribute(FREE_ATTR, "");

        let config = DragConfig::from_attributes(&host).unwrap();
        assert_eq!(config.draggable.as_ref().map(Selector::as_str), Some(".card"));
        assert!(config.into.is_none());
        assert_eq!(config.lane_axis, Axis::Horizontal);
        assert_eq!(config.draggable_axis, Axis::Vertical);
        assert_eq!(config.strategy, DropStrategy::FreePosition);
        assert_eq!(config.effective_ghost(), GhostMode::InPlace);
    }

    #[test]
    fn test_from_attributes_horizontal_draggables() {
        let mut host = Element::new("draggable-div");
        host.set_attribute(DRAGGABLE_HORIZONTAL_ATTR, "");
        let config = DragConfig::from_attributes(&host).unwrap();
        assert_eq!(config.draggable_axis, Axis::Horizontal);
        assert_eq!(config.lane_axis, Axis::Vertical);
        assert_eq!(config, DragConfig::new().horizontal_draggables());
    }

    #[test]
    fn test_from_attributes_bad_selector() {
        let mut host = Element::new("draggable-div");
        host.set_attribute(INTO_ATTR, ".lane >");
        let err = DragConfig::from_attributes(&host).unwrap_err();
        assert!(matches!(err, ConfigError::Selector { attribute: INTO_ATTR, .. }));
    }

    #[test]
    fn test_lanes_and_draggables() {
        let mut doc = Document::new();
        let root = doc.root();
        let board = doc.create_child(root, "div", Rect::ZERO).unwrap();
        let lane = doc.create_child(board, "ul", Rect::ZERO).unwrap();
        let card = doc.create_child(lane, "li", Rect::ZERO).unwrap();
        doc.add_class(lane, "lane").unwrap();
        doc.add_class(card, "card").unwrap();

        let config = DragConfig::new();
        assert_eq!(config.lanes(&doc, board), vec![board]);
        assert_eq!(config.draggables(&doc, board).unwrap(), vec![lane]);

        let config = config
            .with_lanes(Selector::parse(".lane").unwrap())
            .with_draggable(Selector::parse(".card").unwrap());
        assert_eq!(config.lanes(&doc, board), vec![lane]);
        assert_eq!(config.draggables(&doc, board).unwrap(), vec![card]);
    }
}
