//! Notifications emitted to collaborators.

use super::container::ContainerId;
use crate::dom::ElementId;
use serde::{Deserialize, Serialize};

/// Kind of drag notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragEventKind {
    /// A drag session began.
    DragStart,
    /// A drag session committed; the order or position may have changed.
    Change,
}

/// A notification carrying the dragged element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEvent {
    pub container: ContainerId,
    pub kind: DragEventKind,
    pub element: ElementId,
}
