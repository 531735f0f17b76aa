//! Drag engine: containers, sessions, ghosts and drop strategies.

pub mod config;
pub mod container;
pub mod events;
pub mod ghost;
pub mod session;
pub mod strategy;

pub use config::{ConfigError, DragConfig, GhostMode};
pub use container::{ContainerId, DRAG_COUNT_ATTR, DragContainer};
pub use events::{DragEvent, DragEventKind};
pub use session::DragSession;
pub use strategy::{DropStrategy, DropTarget};
