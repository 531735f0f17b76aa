//! Per-drag transient state.

use super::strategy::DropTarget;
use crate::dom::ElementId;
use crate::pointer::PointerId;
use kurbo::{Point, Rect, Vec2};

/// State of one in-flight drag, keyed by the dragged element.
///
/// Created on pointer-down and dropped when the drag ends, whether it was
/// committed or cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// The element being dragged.
    pub draggable: ElementId,
    /// Pointer driving the drag.
    pub pointer_id: PointerId,
    /// On-screen rectangle of the element when the drag began.
    pub start_rect: Rect,
    /// From the pointer to the element's top-left corner at drag start.
    pub offset: Vec2,
    /// Placeholder marking the drop slot.
    pub ghost: ElementId,
    /// Floating copy following the pointer.
    pub copy: ElementId,
    /// Last drop target computed on pointer-move.
    pub target: Option<DropTarget>,
}

impl DragSession {
    pub fn new(
        draggable: ElementId,
        pointer_id: PointerId,
        start_rect: Rect,
        pointer: Point,
        ghost: ElementId,
        copy: ElementId,
    ) -> Self {
        Self {
            draggable,
            pointer_id,
            start_rect,
            offset: start_rect.origin() - pointer,
            ghost,
            copy,
            target: None,
        }
    }

    /// Top-left of the drag copy for a pointer position.
    pub fn copy_origin(&self, pointer: Point) -> Point {
        pointer + self.offset
    }

    /// Rectangle the drag copy covers for a pointer position.
    pub fn copy_rect(&self, pointer: Point) -> Rect {
        Rect::from_origin_size(self.copy_origin(pointer), self.start_rect.size())
    }
}
