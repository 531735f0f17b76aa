//! Pointer events as delivered by the host.

use crate::dom::ElementId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Identifier of a pointer (mouse, pen or a single touch contact).
pub type PointerId = i32;

/// The phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
    /// Capture was taken away without an up or cancel event.
    LostCapture,
}

/// A pointer event in page coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub kind: PointerEventKind,
    pub position: Point,
    /// Element the host resolved as the event target. When absent the
    /// dispatcher hit-tests `position`.
    #[serde(default)]
    pub target: Option<ElementId>,
}

impl PointerEvent {
    /// Create an event without an explicit target.
    pub fn new(kind: PointerEventKind, pointer_id: PointerId, position: Point) -> Self {
        Self {
            pointer_id,
            kind,
            position,
            target: None,
        }
    }

    pub fn down(pointer_id: PointerId, position: Point) -> Self {
        Self::new(PointerEventKind::Down, pointer_id, position)
    }

    pub fn moved(pointer_id: PointerId, position: Point) -> Self {
        Self::new(PointerEventKind::Move, pointer_id, position)
    }

    pub fn up(pointer_id: PointerId, position: Point) -> Self {
        Self::new(PointerEventKind::Up, pointer_id, position)
    }

    pub fn cancel(pointer_id: PointerId, position: Point) -> Self {
        Self::new(PointerEventKind::Cancel, pointer_id, position)
    }

    /// Set the target element.
    pub fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }
}

/// What a handler did with an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// A listener acted on the event.
    pub handled: bool,
    /// The host should suppress its default action (text selection, scrolling).
    pub default_prevented: bool,
}

impl EventOutcome {
    /// Nothing happened.
    pub fn ignored() -> Self {
        Self::default()
    }

    /// The event was consumed.
    pub fn handled() -> Self {
        Self {
            handled: true,
            default_prevented: false,
        }
    }

    /// The event was consumed and its default action should be suppressed.
    pub fn prevent_default() -> Self {
        Self {
            handled: true,
            default_prevented: true,
        }
    }

    /// Combine the outcomes of two listeners.
    pub fn merge(self, other: Self) -> Self {
        Self {
            handled: self.handled || other.handled,
            default_prevented: self.default_prevented || other.default_prevented,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_merge() {
        let merged = EventOutcome::handled().merge(EventOutcome::ignored());
        assert!(merged.handled);
        assert!(!merged.default_prevented);

        let merged = EventOutcome::ignored().merge(EventOutcome::prevent_default());
        assert!(merged.handled);
        assert!(merged.default_prevented);
    }

    #[test]
    fn test_event_deserializes_without_target() {
        let event: PointerEvent = serde_json::from_str(
            r#"{"pointer_id": 3, "kind": "Move", "position": {"x": 4.0, "y": 8.0}}"#,
        )
        .unwrap();
        assert_eq!(event.kind, PointerEventKind::Move);
        assert!(event.target.is_none());
        assert_eq!(event.position, Point::new(4.0, 8.0));
    }
}
