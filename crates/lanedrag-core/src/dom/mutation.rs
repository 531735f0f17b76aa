//! Child-list change journal.

use super::ElementId;

/// Handle for a subscription created by [`super::Document::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

/// One child-list change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The parent whose children changed.
    pub target: ElementId,
    pub added: Vec<ElementId>,
    pub removed: Vec<ElementId>,
}

/// Subscription state for one observed subtree.
#[derive(Debug, Clone)]
pub(crate) struct Observer {
    pub(crate) root: ElementId,
    pub(crate) records: Vec<MutationRecord>,
}

impl Observer {
    pub(crate) fn new(root: ElementId) -> Self {
        Self {
            root,
            records: Vec::new(),
        }
    }
}
