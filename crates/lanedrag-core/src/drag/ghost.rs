//! Ghost placeholder and drag copy lifecycle.

use super::config::GhostMode;
use super::strategy::DropTarget;
use crate::dom::{Document, DomResult, ElementId, OwnerId, Position};
use kurbo::{Point, Rect};

/// Class marking the drop placeholder.
pub const GHOST_CLASS: &str = "ghost";
/// Attribute marking elements owned by an in-flight drag.
pub const DRAGGING_ATTR: &str = "dragging";
/// Stacking order of the drag copy.
pub const COPY_Z_INDEX: i32 = 100;

/// Whether an element is a transient drag artifact (ghost, copy, or a
/// dragged original).
pub fn is_transient(doc: &Document, id: ElementId) -> bool {
    doc.has_attribute(id, DRAGGING_ATTR) || doc.has_class(id, GHOST_CLASS)
}

/// Produce the placeholder for `draggable`.
pub fn request_ghost(doc: &mut Document, draggable: ElementId, mode: GhostMode) -> DomResult<ElementId> {
    match mode {
        GhostMode::InPlace => {
            doc.add_class(draggable, GHOST_CLASS)?;
            doc.set_attribute(draggable, DRAGGING_ATTR, "")?;
            Ok(draggable)
        }
        GhostMode::Clone => {
            let ghost = doc.clone_node(draggable, true)?;
            doc.add_class(ghost, GHOST_CLASS)?;
            doc.set_attribute(ghost, DRAGGING_ATTR, "")?;
            doc.insert_before(draggable, ghost)?;
            doc.set_attribute(draggable, DRAGGING_ATTR, "")?;
            doc.style_mut(draggable)?.hidden = true;
            Ok(ghost)
        }
    }
}

/// Hand the ghost's slot back to the real element and clear all markers.
///
/// An element removed from the document during the drag is not re-inserted.
pub fn release_ghost(doc: &mut Document, draggable: ElementId, ghost: ElementId) -> DomResult<()> {
    if ghost != draggable && doc.exists(ghost) {
        if doc.is_connected(ghost) && doc.is_connected(draggable) {
            doc.insert_before(ghost, draggable)?;
        }
        doc.destroy(ghost)?;
    }
    if doc.exists(draggable) {
        clear_markers(doc, draggable)?;
    }
    Ok(())
}

/// Remove the transient class, attribute and visibility override.
pub fn clear_markers(doc: &mut Document, id: ElementId) -> DomResult<()> {
    doc.remove_class(id, GHOST_CLASS)?;
    doc.remove_attribute(id, DRAGGING_ATTR)?;
    doc.style_mut(id)?.hidden = false;
    Ok(())
}

/// Nearest sibling in one direction that is not a drag artifact.
fn settled_sibling(
    doc: &Document,
    id: ElementId,
    step: fn(&Document, ElementId) -> Option<ElementId>,
) -> Option<ElementId> {
    let mut current = step(doc, id);
    while let Some(sibling) = current {
        if !is_transient(doc, sibling) {
            return Some(sibling);
        }
        current = step(doc, sibling);
    }
    None
}

/// Whether the ghost already sits at `target`.
///
/// Drag copies and hidden originals next to the ghost do not count as
/// neighbours, so the slot they share with the ghost is the same slot.
pub fn ghost_at(doc: &Document, ghost: ElementId, target: DropTarget) -> bool {
    match target {
        DropTarget::Before(element) => settled_sibling(doc, ghost, Document::next_sibling) == Some(element),
        DropTarget::After(element) => settled_sibling(doc, ghost, Document::previous_sibling) == Some(element),
        DropTarget::Append(lane) => {
            doc.parent(ghost) == Some(lane) && settled_sibling(doc, ghost, Document::next_sibling).is_none()
        }
        DropTarget::Position(_) => true,
    }
}

/// Move the ghost to `target`. Returns whether the document was written.
pub fn relocate_ghost(doc: &mut Document, ghost: ElementId, target: DropTarget) -> DomResult<bool> {
    if ghost_at(doc, ghost, target) {
        return Ok(false);
    }
    match target {
        DropTarget::Before(element) => doc.insert_before(element, ghost)?,
        DropTarget::After(element) => doc.insert_after(element, ghost)?,
        DropTarget::Append(lane) => doc.append_child(lane, ghost)?,
        DropTarget::Position(_) => return Ok(false),
    }
    Ok(true)
}

/// Clone `draggable` into a floating copy covering `rect`, inserted right
/// after the original.
pub fn spawn_drag_copy(doc: &mut Document, draggable: ElementId, rect: Rect) -> DomResult<ElementId> {
    let copy = doc.clone_node(draggable, true)?;
    doc.remove_class(copy, GHOST_CLASS)?;
    doc.set_attribute(copy, DRAGGING_ATTR, "")?;

    let style = doc.style_mut(copy)?;
    style.position = Position::Fixed;
    style.width = Some(rect.width());
    style.height = Some(rect.height());
    style.left = Some(rect.x0);
    style.top = Some(rect.y0);
    style.z_index = Some(COPY_Z_INDEX);
    style.hidden = false;

    doc.insert_after(draggable, copy)?;
    Ok(copy)
}

/// Move the drag copy's top-left corner.
pub fn place_drag_copy(doc: &mut Document, copy: ElementId, origin: Point) -> DomResult<()> {
    let style = doc.style_mut(copy)?;
    style.left = Some(origin.x);
    style.top = Some(origin.y);
    Ok(())
}

/// Destroy the drag copy and every listener `owner` bound on it.
pub fn discard_drag_copy(doc: &mut Document, copy: ElementId, owner: OwnerId) -> DomResult<()> {
    doc.remove_listeners(copy, owner);
    if doc.exists(copy) {
        doc.destroy(copy)?;
    }
    Ok(())
}
