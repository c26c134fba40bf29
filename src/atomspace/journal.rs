//! Change journal.
//!
//! The store records which atoms were touched since the journal was last
//! drained. Consumers (cache invalidation, persistence batches) call
//! [`AtomSpace::take_changes`](super::AtomSpace::take_changes) once per
//! committed unit of work.

use std::collections::BTreeSet;

use crate::AtomId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Atoms created.
    pub created: BTreeSet<AtomId>,
    /// Atoms whose truth value was written.
    pub truth: BTreeSet<AtomId>,
    /// Atoms whose attention value was written.
    pub attention: BTreeSet<AtomId>,
    /// Atoms whose incoming set changed (a link naming them appeared or vanished).
    pub incoming: BTreeSet<AtomId>,
    /// Atoms whose tensor attachment changed.
    pub tensor: BTreeSet<AtomId>,
    /// Atoms removed. A removed id never appears in the other sets.
    pub removed: BTreeSet<AtomId>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.truth.is_empty()
            && self.attention.is_empty()
            && self.incoming.is_empty()
            && self.tensor.is_empty()
            && self.removed.is_empty()
    }

    /// Ids whose dependent inferences are stale: truth writes and removals.
    pub fn invalidating(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.truth.iter().chain(self.removed.iter()).copied()
    }

    /// Ids that still exist and need their records rewritten.
    pub fn touched(&self) -> BTreeSet<AtomId> {
        self.created
            .iter()
            .chain(self.truth.iter())
            .chain(self.attention.iter())
            .chain(self.incoming.iter())
            .chain(self.tensor.iter())
            .copied()
            .collect()
    }

    /// Fold a later change set into this one.
    pub fn merge(&mut self, later: ChangeSet) {
        for id in &later.removed {
            self.forget_id(*id);
        }
        self.created.extend(later.created);
        self.truth.extend(later.truth);
        self.attention.extend(later.attention);
        self.incoming.extend(later.incoming);
        self.tensor.extend(later.tensor);
        self.removed.extend(later.removed);
    }

    pub(crate) fn record_created(&mut self, id: AtomId) {
        self.created.insert(id);
    }

    pub(crate) fn record_truth(&mut self, id: AtomId) {
        self.truth.insert(id);
    }

    pub(crate) fn record_attention(&mut self, id: AtomId) {
        self.attention.insert(id);
    }

    pub(crate) fn record_incoming(&mut self, id: AtomId) {
        self.incoming.insert(id);
    }

    pub(crate) fn record_tensor(&mut self, id: AtomId) {
        self.tensor.insert(id);
    }

    pub(crate) fn record_removed(&mut self, id: AtomId) {
        self.forget_id(id);
        self.removed.insert(id);
    }

    fn forget_id(&mut self, id: AtomId) {
        self.created.remove(&id);
        self.truth.remove(&id);
        self.attention.remove(&id);
        self.incoming.remove(&id);
        self.tensor.remove(&id);
    }
}
