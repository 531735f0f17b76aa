//! End-to-end drags through the public API: a two-lane board configured
//! from host attributes, and a free-positioning canvas.

use kurbo::{Point, Rect, Size};
use lanedrag_core::drag::ghost;
use lanedrag_core::{
    Document, DragContainer, DragEventKind, DragRegistry, ElementId, PointerEvent, PointerEventKind, Position,
};
use std::cell::RefCell;
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Board {
    doc: Document,
    host: ElementId,
    lanes: [ElementId; 2],
    cards: Vec<ElementId>,
    container: Rc<RefCell<DragContainer>>,
    registry: DragRegistry,
}

/// Lane "todo" holds three 40px cards, lane "done" is empty.
fn board() -> Board {
    init_logging();
    let mut doc = Document::new();
    let root = doc.root();
    let host = doc.create_child(root, "section", Rect::new(0.0, 0.0, 240.0, 400.0)).unwrap();
    doc.set_attribute(host, "draggable", ".card").unwrap();
    doc.set_attribute(host, "into", ".lane").unwrap();
    doc.set_attribute(host, "lane-horizontal", "").unwrap();

    let todo = doc.create_child(host, "ul", Rect::new(0.0, 0.0, 100.0, 400.0)).unwrap();
    let done = doc.create_child(host, "ul", Rect::new(140.0, 0.0, 240.0, 400.0)).unwrap();
    for lane in [todo, done] {
        doc.add_class(lane, "lane").unwrap();
    }
    let cards: Vec<ElementId> = (0..3)
        .map(|_| {
            let card = doc.create_child(todo, "li", Rect::new(0.0, 0.0, 100.0, 40.0)).unwrap();
            doc.add_class(card, "card").unwrap();
            card
        })
        .collect();
    doc.stack_children(todo, lanedrag_core::Axis::Vertical, 0.0).unwrap();

    let container = DragContainer::from_element(&doc, host).unwrap();
    let container = Rc::new(RefCell::new(container));
    container.borrow_mut().attach(&mut doc).unwrap();
    let mut registry = DragRegistry::new();
    registry.register(&container);

    Board {
        doc,
        host,
        lanes: [todo, done],
        cards,
        container,
        registry,
    }
}

fn drag(board: &mut Board, from: Point, path: &[Point]) {
    board.registry.dispatch(&mut board.doc, &PointerEvent::down(1, from));
    for &point in path {
        board.registry.dispatch(&mut board.doc, &PointerEvent::moved(1, point));
    }
    let end = path.last().copied().unwrap_or(from);
    board.registry.dispatch(&mut board.doc, &PointerEvent::up(1, end));
}

#[test]
fn test_card_moves_into_empty_lane() {
    let mut b = board();
    let card = b.cards[1];
    drag(&mut b, Point::new(50.0, 60.0), &[Point::new(120.0, 60.0), Point::new(190.0, 60.0)]);

    assert_eq!(b.doc.children(b.lanes[1]).unwrap(), &[card]);
    assert_eq!(b.doc.children(b.lanes[0]).unwrap(), &[b.cards[0], b.cards[2]]);
    assert!(!ghost::is_transient(&b.doc, card));
    assert!(!b.doc.has_attribute(b.host, "drag-count"));

    let events = b.registry.take_events();
    let change = events.iter().find(|e| e.kind == DragEventKind::Change).unwrap();
    assert!(b.doc.descendants(b.host).contains(&change.element));
    assert_eq!(change.element, card);
    assert_eq!(change.container, b.container.borrow().id());
}

#[test]
fn test_ghost_tracks_pointer_within_lane() {
    let mut b = board();
    b.registry
        .dispatch(&mut b.doc, &PointerEvent::down(7, Point::new(20.0, 10.0)));
    assert_eq!(b.doc.element(b.host).unwrap().attribute("drag-count"), Some("1"));

    b.registry
        .dispatch(&mut b.doc, &PointerEvent::moved(7, Point::new(20.0, 110.0)));
    let order: Vec<ElementId> = b
        .doc
        .children(b.lanes[0])
        .unwrap()
        .iter()
        .copied()
        .filter(|&id| b.cards.contains(&id))
        .collect();
    assert_eq!(order, vec![b.cards[1], b.cards[2], b.cards[0]]);

    b.registry
        .dispatch(&mut b.doc, &PointerEvent::cancel(7, Point::new(20.0, 110.0)));
    assert_eq!(b.doc.children(b.lanes[0]).unwrap(), &[b.cards[1], b.cards[2], b.cards[0]]);
    assert_eq!(b.container.borrow().drag_count(), 0);
}

#[test]
fn test_cards_added_later_become_draggable() {
    let mut b = board();
    let late = b.doc.create_child(b.lanes[1], "li", Rect::new(140.0, 0.0, 240.0, 40.0)).unwrap();
    b.doc.add_class(late, "card").unwrap();
    b.registry.reconcile_all(&mut b.doc);
    assert_eq!(b.doc.listener_count(late, PointerEventKind::Down), 1);

    drag(&mut b, Point::new(150.0, 10.0), &[Point::new(50.0, 130.0)]);
    assert_eq!(b.doc.children(b.lanes[0]).unwrap(), &[b.cards[0], b.cards[1], b.cards[2], late]);
    assert!(b.doc.children(b.lanes[1]).unwrap().is_empty());
}

#[test]
fn test_free_canvas_clamps_dropped_box() {
    init_logging();
    let mut doc = Document::new();
    let root = doc.root();
    let canvas = doc.create_child(root, "div", Rect::new(0.0, 0.0, 200.0, 200.0)).unwrap();
    doc.set_attribute(canvas, "free", "").unwrap();
    let note = doc
        .create_child(canvas, "div", Rect::from_origin_size(Point::new(20.0, 20.0), Size::new(50.0, 50.0)))
        .unwrap();
    let container = Rc::new(RefCell::new(DragContainer::from_element(&doc, canvas).unwrap()));
    container.borrow_mut().attach(&mut doc).unwrap();
    let mut registry = DragRegistry::new();
    registry.register(&container);

    registry.dispatch(&mut doc, &PointerEvent::down(1, Point::new(20.0, 20.0)));
    registry.dispatch(&mut doc, &PointerEvent::moved(1, Point::new(-10.0, 210.0)));
    registry.dispatch(&mut doc, &PointerEvent::up(1, Point::new(-10.0, 210.0)));

    let style = &doc.element(note).unwrap().style;
    assert_eq!(style.position, Position::Absolute);
    assert!((style.left.unwrap() - 0.0).abs() < f64::EPSILON);
    assert!((style.top.unwrap() - 150.0).abs() < f64::EPSILON);
    assert_eq!(doc.children(canvas).unwrap(), &[note]);
    assert!(!ghost::is_transient(&doc, note));
}
