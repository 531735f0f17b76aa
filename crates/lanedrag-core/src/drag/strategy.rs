//! Drop resolution: where a dragged element lands.
//!
//! Two strategies share the same contract. [`DropStrategy::Reorder`] moves a
//! ghost between the draggables of the nearest lane and commits by handing
//! the ghost's slot to the element. [`DropStrategy::FreePosition`] never
//! touches DOM order; it clamps the dragged box inside the host and commits
//! the clamped coordinates.

use super::config::DragConfig;
use super::ghost;
use super::session::DragSession;
use crate::dom::{Document, DomResult, ElementId, Position};
use crate::geometry::{clamp_within, nearest};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Where a drag would land if released now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropTarget {
    /// Immediately before a sibling draggable.
    Before(ElementId),
    /// Immediately after a sibling draggable.
    After(ElementId),
    /// As the last child of a lane with no other draggables.
    Append(ElementId),
    /// Top-left corner in page coordinates.
    Position(Point),
}

/// Drop resolution strategy, chosen per container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropStrategy {
    /// Reorder draggables within and across lanes.
    #[default]
    Reorder,
    /// Place the element freely inside the host's bounds.
    FreePosition,
}

fn rects(doc: &Document, ids: &[ElementId]) -> DomResult<Vec<(ElementId, Rect)>> {
    ids.iter()
        .map(|&id| doc.bounding_rect(id).map(|rect| (id, rect)))
        .collect()
}

impl DropStrategy {
    /// Compute the drop target for the current pointer position.
    ///
    /// Returns `None` when there is nowhere to drop (no lanes).
    pub fn compute_drop_target(
        self,
        doc: &Document,
        config: &DragConfig,
        host: ElementId,
        session: &DragSession,
        pointer: Point,
    ) -> DomResult<Option<DropTarget>> {
        match self {
            DropStrategy::Reorder => reorder_target(doc, config, host, pointer),
            DropStrategy::FreePosition => {
                let bounds = doc.bounding_rect(host)?;
                let origin = clamp_within(session.copy_rect(pointer), bounds);
                Ok(Some(DropTarget::Position(origin)))
            }
        }
    }

    /// Reflect a freshly computed target while the drag is in flight.
    ///
    /// Returns whether the document was written.
    pub fn preview(self, doc: &mut Document, session: &DragSession, target: DropTarget) -> DomResult<bool> {
        match self {
            DropStrategy::Reorder => {
                if !doc.is_connected(session.ghost) {
                    return Ok(false);
                }
                ghost::relocate_ghost(doc, session.ghost, target)
            }
            DropStrategy::FreePosition => Ok(false),
        }
    }

    /// Finish a drag: settle the element and clear every transient marker.
    pub fn commit(self, doc: &mut Document, session: &DragSession) -> DomResult<()> {
        match self {
            DropStrategy::Reorder => ghost::release_ghost(doc, session.draggable, session.ghost),
            DropStrategy::FreePosition => {
                ghost::release_ghost(doc, session.draggable, session.ghost)?;
                match session.target {
                    Some(DropTarget::Position(origin)) if doc.is_connected(session.draggable) => {
                        place_absolute(doc, session.draggable, origin)
                    }
                    _ => Ok(()),
                }
            }
        }
    }
}

fn reorder_target(
    doc: &Document,
    config: &DragConfig,
    host: ElementId,
    pointer: Point,
) -> DomResult<Option<DropTarget>> {
    let lanes = config.lanes(doc, host);
    let Some(lane) = nearest(rects(doc, &lanes)?, pointer, config.lane_axis).element else {
        return Ok(None);
    };

    let siblings: Vec<ElementId> = config
        .draggables_in(doc, lane)?
        .into_iter()
        .filter(|&id| !ghost::is_transient(doc, id))
        .collect();
    let hit = nearest(rects(doc, &siblings)?, pointer, config.draggable_axis);

    Ok(Some(match (hit.element, hit.before) {
        (Some(element), Some(true)) => DropTarget::Before(element),
        (Some(element), _) => DropTarget::After(element),
        (None, _) => DropTarget::Append(lane),
    }))
}

/// Position `id` absolutely so its top-left lands on `origin` (page
/// coordinates).
fn place_absolute(doc: &mut Document, id: ElementId, origin: Point) -> DomResult<()> {
    let parent_origin = match doc.parent(id) {
        Some(parent) => doc.bounding_rect(parent)?.origin(),
        None => Point::ZERO,
    };
    let style = doc.style_mut(id)?;
    style.position = Position::Absolute;
    style.left = Some(origin.x - parent_origin.x);
    style.top = Some(origin.y - parent_origin.y);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Selector;
    use crate::drag::config::GhostMode;
    use kurbo::Size;

    struct Board {
        doc: Document,
        host: ElementId,
        lanes: Vec<ElementId>,
        cards: Vec<Vec<ElementId>>,
    }

    /// Two 100px wide lanes side by side; the second one is empty.
    fn board() -> Board {
        let mut doc = Document::new();
        let root = doc.root();
        let host = doc.create_child(root, "div", Rect::new(0.0, 0.0, 220.0, 300.0)).unwrap();
        let mut lanes = Vec::new();
        let mut cards = Vec::new();
        for (i, count) in [3u32, 0].into_iter().enumerate() {
            let x = if i == 0 { 0.0 } else { 120.0 };
            let lane = doc.create_child(host, "ul", Rect::new(x, 0.0, x + 100.0, 300.0)).unwrap();
            doc.add_class(lane, "lane").unwrap();
            let lane_cards = (0..count)
                .map(|j| {
                    let y = f64::from(j) * 40.0;
                    let card = doc.create_child(lane, "li", Rect::new(x, y, x + 100.0, y + 40.0)).unwrap();
                    doc.add_class(card, "card").unwrap();
                    card
                })
                .collect();
            lanes.push(lane);
            cards.push(lane_cards);
        }
        Board { doc, host, lanes, cards }
    }

    fn config() -> DragConfig {
        DragConfig::new()
            .with_lanes(Selector::parse(".lane").unwrap())
            .with_draggable(Selector::parse(".card").unwrap())
            .horizontal_lanes()
    }

    fn session_for(board: &Board, draggable: ElementId, pointer: Point) -> DragSession {
        let rect = board.doc.bounding_rect(draggable).unwrap();
        DragSession::new(draggable, 1, rect, pointer, draggable, draggable)
    }

    #[test]
    fn test_reorder_picks_lane_then_sibling() {
        let board = board();
        let session = session_for(&board, board.cards[0][0], Point::new(50.0, 20.0));
        let cards = &board.cards[0];

        let target = DropStrategy::Reorder
            .compute_drop_target(&board.doc, &config(), board.host, &session, Point::new(40.0, 50.0))
            .unwrap();
        assert_eq!(target, Some(DropTarget::Before(cards[1])));

        let target = DropStrategy::Reorder
            .compute_drop_target(&board.doc, &config(), board.host, &session, Point::new(40.0, 115.0))
            .unwrap();
        assert_eq!(target, Some(DropTarget::After(cards[2])));
    }

    #[test]
    fn test_reorder_skips_transient_siblings() {
        let mut board = board();
        let cards = board.cards[0].clone();
        ghost::request_ghost(&mut board.doc, cards[1], GhostMode::InPlace).unwrap();
        let session = session_for(&board, cards[1], Point::new(50.0, 60.0));

        let target = DropStrategy::Reorder
            .compute_drop_target(&board.doc, &config(), board.host, &session, Point::new(40.0, 58.0))
            .unwrap();
        assert_eq!(target, Some(DropTarget::After(cards[0])));
    }

    #[test]
    fn test_reorder_empty_lane_appends() {
        let mut board = board();
        let card = board.cards[0][0];
        ghost::request_ghost(&mut board.doc, card, GhostMode::InPlace).unwrap();
        let session = session_for(&board, card, Point::new(50.0, 20.0));

        let target = DropStrategy::Reorder
            .compute_drop_target(&board.doc, &config(), board.host, &session, Point::new(170.0, 20.0))
            .unwrap();
        assert_eq!(target, Some(DropTarget::Append(board.lanes[1])));

        assert!(DropStrategy::Reorder.preview(&mut board.doc, &session, DropTarget::Append(board.lanes[1])).unwrap());
        assert_eq!(board.doc.children(board.lanes[1]).unwrap(), &[card]);
    }

    #[test]
    fn test_reorder_horizontal_row() {
        let mut doc = Document::new();
        let root = doc.root();
        let row = doc.create_child(root, "div", Rect::new(0.0, 0.0, 120.0, 40.0)).unwrap();
        let chips: Vec<ElementId> = (0..3u32)
            .map(|i| {
                let x = f64::from(i) * 40.0;
                doc.create_child(row, "span", Rect::new(x, 0.0, x + 40.0, 40.0)).unwrap()
            })
            .collect();
        let config = DragConfig::new().horizontal_draggables();
        let session = DragSession::new(chips[0], 1, Rect::new(0.0, 0.0, 40.0, 40.0), Point::ZERO, chips[0], chips[0]);
        ghost::request_ghost(&mut doc, chips[0], GhostMode::InPlace).unwrap();

        let target = DropStrategy::Reorder
            .compute_drop_target(&doc, &config, row, &session, Point::new(50.0, 35.0))
            .unwrap();
        assert_eq!(target, Some(DropTarget::Before(chips[1])));

        let target = DropStrategy::Reorder
            .compute_drop_target(&doc, &config, row, &session, Point::new(110.0, 5.0))
            .unwrap();
        assert_eq!(target, Some(DropTarget::After(chips[2])));
    }

    #[test]
    fn test_reorder_without_lanes() {
        let board = board();
        let session = session_for(&board, board.cards[0][0], Point::ZERO);
        let config = config().with_lanes(Selector::parse(".missing").unwrap());
        let target = DropStrategy::Reorder
            .compute_drop_target(&board.doc, &config, board.host, &session, Point::ZERO)
            .unwrap();
        assert_eq!(target, None);
    }

    #[test]
    fn test_free_position_clamps_and_commits() {
        let mut doc = Document::new();
        let root = doc.root();
        let host = doc.create_child(root, "div", Rect::new(0.0, 0.0, 200.0, 200.0)).unwrap();
        let item = doc
            .create_child(host, "div", Rect::from_origin_size(Point::new(20.0, 20.0), Size::new(50.0, 50.0)))
            .unwrap();
        let mut session = DragSession::new(item, 1, doc.bounding_rect(item).unwrap(), Point::new(20.0, 20.0), item, item);
        ghost::request_ghost(&mut doc, item, GhostMode::InPlace).unwrap();

        let config = DragConfig::new().free_position();
        let target = DropStrategy::FreePosition
            .compute_drop_target(&doc, &config, host, &session, Point::new(-10.0, 210.0))
            .unwrap();
        assert_eq!(target, Some(DropTarget::Position(Point::new(0.0, 150.0))));
        assert!(!DropStrategy::FreePosition.preview(&mut doc, &session, DropTarget::Position(Point::ZERO)).unwrap());

        session.target = target;
        DropStrategy::FreePosition.commit(&mut doc, &session).unwrap();
        assert_eq!(
            doc.bounding_rect(item).unwrap(),
            Rect::from_origin_size(Point::new(0.0, 150.0), Size::new(50.0, 50.0))
        );
        assert!(!ghost::is_transient(&doc, item));
        assert_eq!(doc.children(host).unwrap(), &[item]);
    }

    #[test]
    fn test_free_position_without_move_leaves_element() {
        let mut doc = Document::new();
        let root = doc.root();
        let host = doc.create_child(root, "div", Rect::new(0.0, 0.0, 200.0, 200.0)).unwrap();
        let item = doc.create_child(host, "div", Rect::new(10.0, 10.0, 60.0, 60.0)).unwrap();
        let session = DragSession::new(item, 1, doc.bounding_rect(item).unwrap(), Point::new(20.0, 20.0), item, item);
        ghost::request_ghost(&mut doc, item, GhostMode::InPlace).unwrap();

        DropStrategy::FreePosition.commit(&mut doc, &session).unwrap();
        assert_eq!(doc.element(item).unwrap().style.position, Position::Static);
        assert_eq!(doc.bounding_rect(item).unwrap(), Rect::new(10.0, 10.0, 60.0, 60.0));
    }
}
