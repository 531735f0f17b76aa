//! LaneDrag Core Library
//!
//! Pointer-driven drag-and-drop reordering of elements inside lanes, with a
//! free-positioning variant. Hosts mirror their element tree into a
//! [`Document`] and feed pointer events through a [`DragRegistry`].

pub mod dom;
pub mod drag;
pub mod geometry;
pub mod pointer;
pub mod registry;

pub use dom::{Document, DomError, DomResult, Element, ElementId, Position, Selector, SelectorError, Style};
pub use drag::{
    ConfigError, ContainerId, DragConfig, DragContainer, DragEvent, DragEventKind, DragSession, DropStrategy,
    DropTarget, GhostMode,
};
pub use geometry::{Axis, Nearest, clamp_within, nearest};
pub use pointer::{EventOutcome, PointerEvent, PointerEventKind, PointerId};
pub use registry::DragRegistry;
