//! Pointer event routing to drag containers.
//!
//! The registry only looks containers up; callers own them through
//! `Rc<RefCell<DragContainer>>`. A container dropped without being
//! unregistered is noticed on the next dispatch and its listeners purged.

use crate::dom::{Document, ElementId};
use crate::drag::{ContainerId, DragContainer, DragEvent};
use crate::pointer::{EventOutcome, PointerEvent, PointerEventKind, PointerId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Routes pointer events to the containers whose listeners they reach.
#[derive(Debug, Default)]
pub struct DragRegistry {
    containers: Vec<(ContainerId, Weak<RefCell<DragContainer>>)>,
}

impl DragRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start routing events to `container`. Registering twice is a no-op.
    pub fn register(&mut self, container: &Rc<RefCell<DragContainer>>) -> ContainerId {
        let id = container.borrow().id();
        if !self.contains(id) {
            self.containers.push((id, Rc::downgrade(container)));
        }
        id
    }

    /// Stop routing to a container, detaching it if it is still alive.
    ///
    /// Returns whether the container was registered.
    pub fn unregister(&mut self, doc: &mut Document, id: ContainerId) -> bool {
        let Some(index) = self.containers.iter().position(|(cid, _)| *cid == id) else {
            return false;
        };
        let (_, weak) = self.containers.remove(index);
        if let Some(container) = weak.upgrade() {
            match container.try_borrow_mut() {
                Ok(mut container) => {
                    if let Err(err) = container.detach(doc) {
                        log::warn!("container {}: detach failed: {}", id, err);
                    }
                }
                Err(_) => log::warn!("container {} is busy, dropping its listeners only", id),
            }
        }
        doc.remove_owner(id);
        true
    }

    pub fn contains(&self, id: ContainerId) -> bool {
        self.containers.iter().any(|(cid, _)| *cid == id)
    }

    /// Number of registered containers, including dead ones not yet purged.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Upgrade `owner`, purging it when its container was dropped.
    fn live(&mut self, doc: &mut Document, owner: ContainerId) -> Option<Rc<RefCell<DragContainer>>> {
        let index = self.containers.iter().position(|(cid, _)| *cid == owner)?;
        match self.containers[index].1.upgrade() {
            Some(container) => Some(container),
            None => {
                log::warn!("container {} was dropped without unregistering, purging its listeners", owner);
                self.containers.remove(index);
                doc.remove_owner(owner);
                None
            }
        }
    }

    /// Every live container; dead ones are purged.
    fn live_all(&mut self, doc: &mut Document) -> Vec<Rc<RefCell<DragContainer>>> {
        let ids: Vec<ContainerId> = self.containers.iter().map(|(id, _)| *id).collect();
        ids.into_iter().filter_map(|id| self.live(doc, id)).collect()
    }

    /// Element an event is delivered to before bubbling.
    fn route(doc: &Document, event: &PointerEvent) -> Option<ElementId> {
        let captured = match event.kind {
            PointerEventKind::Down => None,
            _ => doc.capture_target(event.pointer_id),
        };
        captured
            .or(event.target)
            .filter(|&id| doc.is_connected(id))
            .or_else(|| doc.hit_test(event.position))
    }

    /// Deliver a pointer event, then settle capture losses and pending
    /// tree changes.
    pub fn dispatch(&mut self, doc: &mut Document, event: &PointerEvent) -> EventOutcome {
        let outcome = match event.kind {
            PointerEventKind::LostCapture => match event.target {
                Some(element) => self.deliver_lost_capture(doc, element, event.pointer_id),
                None => EventOutcome::ignored(),
            },
            _ => match Self::route(doc, event) {
                Some(target) => self.bubble(doc, target, event),
                None => EventOutcome::ignored(),
            },
        };
        self.reconcile_all(doc);
        outcome
    }

    /// Run listeners on `target` and each of its ancestors.
    fn bubble(&mut self, doc: &mut Document, target: ElementId, event: &PointerEvent) -> EventOutcome {
        let mut path = vec![target];
        let mut current = target;
        while let Some(parent) = doc.parent(current) {
            path.push(parent);
            current = parent;
        }

        let mut outcome = EventOutcome::ignored();
        for node in path {
            for owner in doc.listeners_on(node, event.kind) {
                let Some(container) = self.live(doc, owner) else {
                    continue;
                };
                let Ok(mut container) = container.try_borrow_mut() else {
                    log::warn!("container {} is busy, skipping {:?}", owner, event.kind);
                    continue;
                };
                match container.handle_event(doc, node, event) {
                    Ok(handled) => outcome = outcome.merge(handled),
                    Err(err) => log::warn!("container {}: {:?} on {} failed: {}", owner, event.kind, node, err),
                }
            }
        }
        outcome
    }

    /// Offer a capture loss to every live container; only the owner of the
    /// element acts on it.
    fn deliver_lost_capture(&mut self, doc: &mut Document, element: ElementId, pointer: PointerId) -> EventOutcome {
        let mut outcome = EventOutcome::ignored();
        for container in self.live_all(doc) {
            let Ok(mut container) = container.try_borrow_mut() else {
                continue;
            };
            match container.lost_capture(doc, element, pointer) {
                Ok(handled) => outcome = outcome.merge(handled),
                Err(err) => log::warn!("container {}: lost capture on {} failed: {}", container.id(), element, err),
            }
        }
        outcome
    }

    /// Deliver queued capture losses and re-bind containers whose subtree
    /// changed. Returns how many containers re-bound.
    ///
    /// Hosts that mutate the tree outside [`Self::dispatch`] call this to
    /// bring bindings up to date.
    pub fn reconcile_all(&mut self, doc: &mut Document) -> usize {
        loop {
            let lost = doc.take_lost_captures();
            if lost.is_empty() {
                break;
            }
            for (element, pointer) in lost {
                self.deliver_lost_capture(doc, element, pointer);
            }
        }

        let mut reconciled = 0;
        for container in self.live_all(doc) {
            let Ok(mut container) = container.try_borrow_mut() else {
                continue;
            };
            match container.process_mutations(doc) {
                Ok(true) => reconciled += 1,
                Ok(false) => {}
                Err(err) => log::warn!("container {}: reconcile failed: {}", container.id(), err),
            }
        }
        reconciled
    }

    /// Drain the notifications of every live container, container by
    /// container.
    pub fn take_events(&self) -> Vec<DragEvent> {
        self.containers
            .iter()
            .filter_map(|(_, weak)| weak.upgrade())
            .flat_map(|container| {
                container
                    .try_borrow_mut()
                    .map(|mut container| container.take_events())
                    .unwrap_or_default()
            })
            .collect()
    }
}
