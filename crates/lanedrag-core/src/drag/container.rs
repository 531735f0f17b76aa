//! The drag container: binds drag behavior to a changing set of draggables.

use super::config::{ConfigError, DRAGGABLE_ATTR, DragConfig};
use super::events::{DragEvent, DragEventKind};
use super::ghost;
use super::session::DragSession;
use crate::dom::{Document, DomResult, ElementId, ObserverId};
use crate::pointer::{EventOutcome, PointerEvent, PointerEventKind, PointerId};
use kurbo::Point;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Identity of a drag container; also the owner id of its listeners.
pub type ContainerId = Uuid;

/// Host attribute mirroring the number of active drags.
pub const DRAG_COUNT_ATTR: &str = "drag-count";

/// Listeners bound on a drag copy for the lifetime of its session.
const COPY_EVENTS: [PointerEventKind; 4] = [
    PointerEventKind::Move,
    PointerEventKind::Up,
    PointerEventKind::Cancel,
    PointerEventKind::LostCapture,
];

/// Drag-and-drop controller for one host element.
///
/// The container owns its active sessions and its mutation subscription.
/// It never owns the draggables themselves; collaborators add and remove
/// them freely and the container re-binds on [`Self::reconcile`].
#[derive(Debug)]
pub struct DragContainer {
    id: ContainerId,
    host: ElementId,
    config: DragConfig,
    /// Draggables carrying this container's pointer-down listener.
    bound: HashSet<ElementId>,
    /// Active sessions keyed by the dragged element.
    sessions: HashMap<ElementId, DragSession>,
    /// Drag copy to the element it follows.
    copies: HashMap<ElementId, ElementId>,
    observer: Option<ObserverId>,
    events: Vec<DragEvent>,
}

impl DragContainer {
    /// Create a detached container; call [`Self::attach`] to start.
    pub fn new(host: ElementId, config: DragConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            host,
            config,
            bound: HashSet::new(),
            sessions: HashMap::new(),
            copies: HashMap::new(),
            observer: None,
            events: Vec::new(),
        }
    }

    /// Create a container configured by the host element's attributes.
    pub fn from_element(doc: &Document, host: ElementId) -> Result<Self, ConfigError> {
        let config = DragConfig::from_attributes(doc.element(host)?)?;
        Ok(Self::new(host, config))
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn host(&self) -> ElementId {
        self.host
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Number of drags in progress.
    pub fn drag_count(&self) -> usize {
        self.sessions.len()
    }

    /// Whether `element` is being dragged.
    pub fn is_dragging(&self, element: ElementId) -> bool {
        self.sessions.contains_key(&element)
    }

    pub fn session(&self, element: ElementId) -> Option<&DragSession> {
        self.sessions.get(&element)
    }

    /// Whether `element` carries this container's pointer-down listener.
    pub fn is_bound(&self, element: ElementId) -> bool {
        self.bound.contains(&element)
    }

    pub fn is_attached(&self) -> bool {
        self.observer.is_some()
    }

    /// Current draggables under the host.
    pub fn draggables(&self, doc: &Document) -> DomResult<Vec<ElementId>> {
        self.config.draggables(doc, self.host)
    }

    /// Current lanes under the host.
    pub fn lanes(&self, doc: &Document) -> Vec<ElementId> {
        self.config.lanes(doc, self.host)
    }

    /// Pending notifications, oldest first.
    pub fn events(&self) -> &[DragEvent] {
        &self.events
    }

    /// Drain pending notifications.
    pub fn take_events(&mut self) -> Vec<DragEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, kind: DragEventKind, element: ElementId) {
        self.events.push(DragEvent {
            container: self.id,
            kind,
            element,
        });
    }

    /// Start observing the host and bind the current draggables.
    pub fn attach(&mut self, doc: &mut Document) -> DomResult<()> {
        if self.observer.is_none() {
            self.observer = Some(doc.observe(self.host)?);
        }
        self.reconcile(doc)?;
        Ok(())
    }

    /// Stop observing and unbind everything. Active drags are committed
    /// where their ghost currently sits.
    pub fn detach(&mut self, doc: &mut Document) -> DomResult<()> {
        let active: Vec<ElementId> = self.sessions.keys().copied().collect();
        for draggable in active {
            if let Some(session) = self.sessions.get(&draggable) {
                doc.release_pointer_capture(session.copy, session.pointer_id);
            }
            self.end_session(doc, draggable)?;
        }
        if let Some(observer) = self.observer.take() {
            doc.disconnect(observer);
        }
        doc.remove_owner(self.id);
        self.bound.clear();
        Ok(())
    }

    /// Bind every draggable that is not bound yet.
    ///
    /// Idempotent: already bound elements and transient drag artifacts are
    /// skipped. Bindings of elements that left the document are dropped.
    /// Returns the number of newly bound elements.
    pub fn reconcile(&mut self, doc: &mut Document) -> DomResult<usize> {
        let gone: Vec<ElementId> = self.bound.iter().copied().filter(|&id| !doc.is_connected(id)).collect();
        for id in &gone {
            doc.remove_listeners(*id, self.id);
            self.bound.remove(id);
        }

        let mut added = 0;
        for draggable in self.draggables(doc)? {
            if self.bound.contains(&draggable) || doc.has_attribute(draggable, ghost::DRAGGING_ATTR) {
                continue;
            }
            doc.add_listener(draggable, PointerEventKind::Down, self.id)?;
            self.bound.insert(draggable);
            added += 1;
        }

        if added > 0 || !gone.is_empty() {
            log::debug!(
                "container {}: bound {} draggable(s), dropped {}, {} total",
                self.id,
                added,
                gone.len(),
                self.bound.len()
            );
        }
        Ok(added)
    }

    /// Re-bind if the host's subtree changed since the last call.
    pub fn process_mutations(&mut self, doc: &mut Document) -> DomResult<bool> {
        let Some(observer) = self.observer else {
            return Ok(false);
        };
        if doc.take_records(observer).is_empty() {
            return Ok(false);
        }
        self.reconcile(doc)?;
        Ok(true)
    }

    /// React to a change of one of the host's attributes.
    ///
    /// Configuration attributes are re-read; a new draggable selector also
    /// re-binds. Returns whether a reconcile ran.
    pub fn attribute_changed(&mut self, doc: &mut Document, name: &str) -> Result<bool, ConfigError> {
        if !DragConfig::is_config_attribute(name) {
            return Ok(false);
        }
        let config = DragConfig::from_attributes(doc.element(self.host)?)?;
        let selector_changed = config.draggable != self.config.draggable;
        self.config = config;
        if name == DRAGGABLE_ATTR && selector_changed && self.is_attached() {
            self.reconcile(doc)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Run `f` with mutation observation suspended, so the container's own
    /// writes do not trigger a reconcile. Changes recorded before the
    /// suspension are not lost.
    fn unobserved<T>(
        &mut self,
        doc: &mut Document,
        f: impl FnOnce(&mut Self, &mut Document) -> DomResult<T>,
    ) -> DomResult<T> {
        let mut pending = false;
        let observing = match self.observer.take() {
            Some(observer) => {
                pending = !doc.take_records(observer).is_empty();
                doc.disconnect(observer);
                true
            }
            None => false,
        };

        let result = f(self, doc);

        if observing && doc.exists(self.host) {
            self.observer = Some(doc.observe(self.host)?);
            if pending {
                self.reconcile(doc)?;
            }
        }
        result
    }

    fn sync_drag_count(&self, doc: &mut Document) -> DomResult<()> {
        if !doc.exists(self.host) {
            return Ok(());
        }
        match self.sessions.len() {
            0 => doc.remove_attribute(self.host, DRAG_COUNT_ATTR),
            count => doc.set_attribute(self.host, DRAG_COUNT_ATTR, &count.to_string()),
        }
    }

    /// Handle a pointer event delivered to `current_target`, an element on
    /// which this container bound a listener.
    pub fn handle_event(
        &mut self,
        doc: &mut Document,
        current_target: ElementId,
        event: &PointerEvent,
    ) -> DomResult<EventOutcome> {
        match event.kind {
            PointerEventKind::Down => self.pointer_down(doc, current_target, event),
            PointerEventKind::Move => self.pointer_move(doc, current_target, event),
            PointerEventKind::Up | PointerEventKind::Cancel => self.pointer_up(doc, current_target, event),
            PointerEventKind::LostCapture => self.lost_capture(doc, current_target, event.pointer_id),
        }
    }

    /// Start a drag on `draggable`.
    ///
    /// Ignored when the element already has a session, when the pointer is
    /// already captured by one of this container's drag copies (so a single
    /// pointer never drives two sessions), or when the element is no longer
    /// a connected draggable of the host.
    fn pointer_down(&mut self, doc: &mut Document, draggable: ElementId, event: &PointerEvent) -> DomResult<EventOutcome> {
        if self.sessions.contains_key(&draggable) {
            return Ok(EventOutcome::ignored());
        }
        if let Some(captor) = doc.capture_target(event.pointer_id) {
            if self.copies.contains_key(&captor) {
                return Ok(EventOutcome::ignored());
            }
        }
        if !doc.is_connected(draggable) || !self.bound.contains(&draggable) {
            return Ok(EventOutcome::ignored());
        }
        if !self.draggables(doc)?.contains(&draggable) {
            return Ok(EventOutcome::ignored());
        }

        self.unobserved(doc, |this, doc| this.begin_session(doc, draggable, event))?;
        Ok(EventOutcome::handled())
    }

    fn begin_session(&mut self, doc: &mut Document, draggable: ElementId, event: &PointerEvent) -> DomResult<()> {
        let rect = doc.bounding_rect(draggable)?;
        let copy = ghost::spawn_drag_copy(doc, draggable, rect)?;
        let ghost = match self.arm_copy(doc, draggable, copy, event.pointer_id) {
            Ok(ghost) => ghost,
            Err(err) => {
                doc.release_pointer_capture(copy, event.pointer_id);
                ghost::discard_drag_copy(doc, copy, self.id)?;
                if doc.exists(draggable) {
                    ghost::clear_markers(doc, draggable)?;
                }
                return Err(err);
            }
        };

        let session = DragSession::new(draggable, event.pointer_id, rect, event.position, ghost, copy);
        self.copies.insert(copy, draggable);
        self.sessions.insert(draggable, session);
        self.sync_drag_count(doc)?;
        self.emit(DragEventKind::DragStart, draggable);

        log::debug!(
            "container {}: drag started for {} (pointer {}, {} active)",
            self.id,
            draggable,
            event.pointer_id,
            self.sessions.len()
        );
        Ok(())
    }

    /// Capture the pointer on a fresh copy, bind its listeners and mark the
    /// ghost. Capture runs first so a failure leaves no marker behind.
    fn arm_copy(
        &self,
        doc: &mut Document,
        draggable: ElementId,
        copy: ElementId,
        pointer: PointerId,
    ) -> DomResult<ElementId> {
        doc.set_pointer_capture(copy, pointer)?;
        for kind in COPY_EVENTS {
            doc.add_listener(copy, kind, self.id)?;
        }
        ghost::request_ghost(doc, draggable, self.config.effective_ghost())
    }

    fn pointer_move(&mut self, doc: &mut Document, copy: ElementId, event: &PointerEvent) -> DomResult<EventOutcome> {
        let Some(&draggable) = self.copies.get(&copy) else {
            return Ok(EventOutcome::ignored());
        };
        if !doc.has_pointer_capture(copy, event.pointer_id) {
            return Ok(EventOutcome::ignored());
        }

        self.unobserved(doc, |this, doc| this.update_position(doc, draggable, event.position))?;
        Ok(EventOutcome::prevent_default())
    }

    /// Move the drag copy to follow the pointer and update the drop target.
    fn update_position(&mut self, doc: &mut Document, draggable: ElementId, pointer: Point) -> DomResult<()> {
        let strategy = self.config.strategy;
        let Some(session) = self.sessions.get_mut(&draggable) else {
            return Ok(());
        };

        ghost::place_drag_copy(doc, session.copy, session.copy_origin(pointer))?;
        let target = strategy.compute_drop_target(doc, &self.config, self.host, session, pointer)?;
        session.target = target;
        if let Some(target) = target {
            if strategy.preview(doc, session, target)? {
                log::trace!("container {}: ghost of {} moved to {:?}", self.id, draggable, target);
            }
        }
        Ok(())
    }

    fn pointer_up(&mut self, doc: &mut Document, copy: ElementId, event: &PointerEvent) -> DomResult<EventOutcome> {
        let Some(&draggable) = self.copies.get(&copy) else {
            return Ok(EventOutcome::ignored());
        };
        if !doc.has_pointer_capture(copy, event.pointer_id) {
            return Ok(EventOutcome::ignored());
        }
        doc.release_pointer_capture(copy, event.pointer_id);

        self.unobserved(doc, |this, doc| this.end_session(doc, draggable))?;
        Ok(EventOutcome::handled())
    }

    /// End the session whose copy lost capture without an up or cancel.
    ///
    /// The drag is committed where its ghost currently sits, the same as a
    /// cancel. Losses for elements this container does not own are ignored.
    pub fn lost_capture(&mut self, doc: &mut Document, copy: ElementId, pointer: PointerId) -> DomResult<EventOutcome> {
        let Some(&draggable) = self.copies.get(&copy) else {
            return Ok(EventOutcome::ignored());
        };
        if self.sessions.get(&draggable).is_none_or(|s| s.pointer_id != pointer) {
            return Ok(EventOutcome::ignored());
        }
        log::warn!(
            "container {}: pointer {} capture lost while dragging {}, committing in place",
            self.id,
            pointer,
            draggable
        );
        self.unobserved(doc, |this, doc| this.end_session(doc, draggable))?;
        Ok(EventOutcome::handled())
    }

    /// Tear down a session: discard the copy, commit, update the count and
    /// notify. Notification is skipped for elements no longer in the
    /// document.
    fn end_session(&mut self, doc: &mut Document, draggable: ElementId) -> DomResult<()> {
        let Some(session) = self.sessions.remove(&draggable) else {
            return Ok(());
        };
        self.copies.remove(&session.copy);

        ghost::discard_drag_copy(doc, session.copy, self.id)?;
        self.config.strategy.commit(doc, &session)?;
        self.sync_drag_count(doc)?;

        if doc.is_connected(draggable) {
            self.emit(DragEventKind::Change, draggable);
            log::debug!("container {}: drag of {} committed", self.id, draggable);
        } else {
            log::debug!("container {}: dragged element {} left the document", self.id, draggable);
        }
        Ok(())
    }
}
