//! Arena-backed atom store.

use std::collections::{BTreeSet, HashMap};

use super::atom::{Atom, AtomKind};
use super::journal::ChangeSet;
use super::AtomSpaceError;
use crate::{AtomId, AtomType, AttentionValue, LinkType, NodeType, TensorHandle, TruthValue};

/// The hypergraph store.
///
/// Ids start at 1 and come from `next_id`; removed slots stay `None` so an id
/// is never handed out twice.
#[derive(Clone, Debug)]
pub struct AtomSpace {
    slots: Vec<Option<Atom>>,
    next_id: u64,
    live: usize,
    by_type: HashMap<AtomType, BTreeSet<AtomId>>,
    by_name: HashMap<String, BTreeSet<AtomId>>,
    node_index: HashMap<(NodeType, String), AtomId>,
    link_index: HashMap<(LinkType, Vec<AtomId>), AtomId>,
    journal: ChangeSet,
}

impl Default for AtomSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomSpace {
    pub fn new() -> Self {
        Self {
            // slot 0 is never used
            slots: vec![None],
            next_id: 1,
            live: 0,
            by_type: HashMap::new(),
            by_name: HashMap::new(),
            node_index: HashMap::new(),
            link_index: HashMap::new(),
            journal: ChangeSet::default(),
        }
    }

    // =========================================================================
    // CREATION
    // =========================================================================

    /// Add a node, or return the id of the identical node already stored.
    pub fn add_node(&mut self, node_type: NodeType, name: impl Into<String>) -> AtomId {
        let name = name.into();
        if let Some(&id) = self.node_index.get(&(node_type, name.clone())) {
            return id;
        }

        let id = self.allocate_id();
        self.node_index.insert((node_type, name.clone()), id);
        self.by_name.entry(name.clone()).or_default().insert(id);
        self.insert_atom(Atom::new(id, AtomKind::Node { node_type, name }));
        id
    }

    /// Add a link, or return the id of the identical link already stored.
    ///
    /// Every outgoing id must name a live atom.
    pub fn add_link(
        &mut self,
        link_type: LinkType,
        outgoing: impl Into<Vec<AtomId>>,
    ) -> Result<AtomId, AtomSpaceError> {
        let outgoing = outgoing.into();
        if outgoing.is_empty() {
            return Err(AtomSpaceError::EmptyOutgoing(link_type));
        }
        if let Some(&missing) = outgoing.iter().find(|id| !self.contains(**id)) {
            return Err(AtomSpaceError::UnknownAtom(missing));
        }
        if let Some(&id) = self.link_index.get(&(link_type, outgoing.clone())) {
            return Ok(id);
        }

        let id = self.allocate_id();
        self.link_index.insert((link_type, outgoing.clone()), id);
        self.link_incoming(id, &outgoing);
        self.insert_atom(Atom::new(id, AtomKind::Link { link_type, outgoing }));
        Ok(id)
    }

    /// Add a link and set its truth value in one step.
    pub fn add_link_with_tv(
        &mut self,
        link_type: LinkType,
        outgoing: impl Into<Vec<AtomId>>,
        tv: TruthValue,
    ) -> Result<AtomId, AtomSpaceError> {
        let id = self.add_link(link_type, outgoing)?;
        self.set_truth_value(id, tv);
        Ok(id)
    }

    /// Add a node and set its truth value in one step.
    pub fn add_node_with_tv(
        &mut self,
        node_type: NodeType,
        name: impl Into<String>,
        tv: TruthValue,
    ) -> AtomId {
        let id = self.add_node(node_type, name);
        self.set_truth_value(id, tv);
        id
    }

    fn allocate_id(&mut self) -> AtomId {
        let id = AtomId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_atom(&mut self, atom: Atom) {
        let id = atom.id;
        let idx = id.0 as usize;
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, None);
        }
        self.by_type.entry(atom.atom_type()).or_default().insert(id);
        self.slots[idx] = Some(atom);
        self.live += 1;
        self.journal.record_created(id);
    }

    fn link_incoming(&mut self, link: AtomId, outgoing: &[AtomId]) {
        for &target in outgoing {
            if let Some(atom) = self.slot_mut(target) {
                if atom.incoming.insert(link) {
                    self.journal.record_incoming(target);
                }
            }
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    #[inline]
    fn slot(&self, id: AtomId) -> Option<&Atom> {
        self.slots.get(id.0 as usize).and_then(|s| s.as_ref())
    }

    #[inline]
    fn slot_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.slots.get_mut(id.0 as usize).and_then(|s| s.as_mut())
    }

    pub fn get(&self, id: AtomId) -> Option<&Atom> {
        self.slot(id)
    }

    #[inline]
    pub fn contains(&self, id: AtomId) -> bool {
        self.slot(id).is_some()
    }

    /// Number of live atoms.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The id the next created atom will receive.
    pub fn next_id(&self) -> AtomId {
        AtomId(self.next_id)
    }

    /// Live atoms, ascending id.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> + '_ {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    /// Live atom ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.iter().map(|a| a.id)
    }

    pub fn atom_type(&self, id: AtomId) -> Option<AtomType> {
        self.slot(id).map(|a| a.atom_type())
    }

    pub fn truth_value(&self, id: AtomId) -> Option<TruthValue> {
        self.slot(id).map(|a| a.tv)
    }

    pub fn attention_value(&self, id: AtomId) -> Option<AttentionValue> {
        self.slot(id).map(|a| a.av)
    }

    /// Outgoing set of a link; empty for nodes and unknown ids.
    pub fn outgoing(&self, id: AtomId) -> &[AtomId] {
        self.slot(id).map(|a| a.outgoing()).unwrap_or(&[])
    }

    /// Links containing `id`, ascending.
    pub fn incoming(&self, id: AtomId) -> Vec<AtomId> {
        self.slot(id)
            .map(|a| a.incoming.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Links of one type containing `id`, ascending.
    pub fn incoming_by_type(&self, id: AtomId, link_type: LinkType) -> Vec<AtomId> {
        let Some(atom) = self.slot(id) else {
            return Vec::new();
        };
        atom.incoming
            .iter()
            .copied()
            .filter(|l| self.slot(*l).and_then(|a| a.link_type()) == Some(link_type))
            .collect()
    }

    pub fn find_by_type(&self, atom_type: impl Into<AtomType>) -> Vec<AtomId> {
        self.by_type
            .get(&atom_type.into())
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Nodes of any type carrying `name`.
    pub fn find_by_name(&self, name: &str) -> Vec<AtomId> {
        self.by_name
            .get(name)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn find_node(&self, node_type: NodeType, name: &str) -> Option<AtomId> {
        self.node_index.get(&(node_type, name.to_string())).copied()
    }

    pub fn find_link(&self, link_type: LinkType, outgoing: &[AtomId]) -> Option<AtomId> {
        self.link_index.get(&(link_type, outgoing.to_vec())).copied()
    }

    /// Short human label: node name, or `Type(a, b)` for links.
    pub fn label(&self, id: AtomId) -> String {
        match self.slot(id) {
            None => format!("?{}", id),
            Some(atom) => match &atom.kind {
                AtomKind::Node { name, .. } => name.clone(),
                AtomKind::Link { link_type, outgoing } => {
                    let parts: Vec<String> = outgoing.iter().map(|o| self.label(*o)).collect();
                    format!("{}({})", link_type.name().trim_end_matches("Link"), parts.join(", "))
                }
            },
        }
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Write a truth value (clamped). Returns false for unknown ids.
    pub fn set_truth_value(&mut self, id: AtomId, tv: TruthValue) -> bool {
        let Some(atom) = self.slot_mut(id) else {
            return false;
        };
        atom.tv = tv.clamped();
        self.journal.record_truth(id);
        true
    }

    /// Raw attention write. Conservation is only maintained when attention
    /// moves through [`AttentionBank`](crate::attention::AttentionBank).
    pub fn set_attention_value(&mut self, id: AtomId, av: AttentionValue) -> bool {
        let Some(atom) = self.slot_mut(id) else {
            return false;
        };
        atom.av = av;
        self.journal.record_attention(id);
        true
    }

    /// Attach an external tensor. Replacing an attachment must keep its shape.
    /// Returns the previous handle.
    pub fn attach_tensor(
        &mut self,
        id: AtomId,
        handle: TensorHandle,
    ) -> Result<Option<TensorHandle>, AtomSpaceError> {
        let atom = self.slot_mut(id).ok_or(AtomSpaceError::UnknownAtom(id))?;
        if let Some(existing) = &atom.tensor {
            if existing.shape != handle.shape {
                return Err(AtomSpaceError::ShapeMismatch {
                    expected: existing.shape.clone(),
                    got: handle.shape,
                });
            }
        }
        let previous = atom.tensor.replace(handle);
        self.journal.record_tensor(id);
        Ok(previous)
    }

    pub fn tensor(&self, id: AtomId) -> Option<&TensorHandle> {
        self.slot(id).and_then(|a| a.tensor.as_ref())
    }

    pub fn detach_tensor(&mut self, id: AtomId) -> Option<TensorHandle> {
        let previous = self.slot_mut(id)?.tensor.take();
        if previous.is_some() {
            self.journal.record_tensor(id);
        }
        previous
    }

    // =========================================================================
    // REMOVAL
    // =========================================================================

    /// Remove an atom.
    ///
    /// Returns `None` if the id is unknown, or if the atom is still named by a
    /// link and `recursive` is false. A recursive removal takes the incoming
    /// links with it (depth first). The removed atoms are returned in removal
    /// order with their final truth and attention values.
    pub fn remove(&mut self, id: AtomId, recursive: bool) -> Option<Vec<Atom>> {
        let atom = self.slot(id)?;
        if !recursive && !atom.incoming.is_empty() {
            return None;
        }
        let mut removed = Vec::new();
        self.remove_inner(id, &mut removed);
        Some(removed)
    }

    /// `id` plus every link that (transitively) contains it, ascending.
    pub fn incoming_closure(&self, id: AtomId) -> BTreeSet<AtomId> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            if let Some(atom) = self.slot(next) {
                stack.extend(atom.incoming.iter().copied());
            }
        }
        seen.retain(|i| self.contains(*i));
        seen
    }

    fn remove_inner(&mut self, id: AtomId, removed: &mut Vec<Atom>) {
        let incoming: Vec<AtomId> = match self.slot(id) {
            Some(atom) => atom.incoming.iter().copied().collect(),
            None => return,
        };
        for link in incoming {
            self.remove_inner(link, removed);
        }

        let Some(atom) = self.slots[id.0 as usize].take() else {
            return;
        };
        self.live -= 1;

        if let Some(set) = self.by_type.get_mut(&atom.atom_type()) {
            set.remove(&id);
        }
        match &atom.kind {
            AtomKind::Node { node_type, name } => {
                self.node_index.remove(&(*node_type, name.clone()));
                if let Some(set) = self.by_name.get_mut(name) {
                    set.remove(&id);
                    if set.is_empty() {
                        self.by_name.remove(name);
                    }
                }
            }
            AtomKind::Link { link_type, outgoing } => {
                self.link_index.remove(&(*link_type, outgoing.clone()));
                for &target in outgoing {
                    if let Some(t) = self.slot_mut(target) {
                        if t.incoming.remove(&id) {
                            self.journal.record_incoming(target);
                        }
                    }
                }
            }
        }
        self.journal.record_removed(id);
        removed.push(atom);
    }

    // =========================================================================
    // JOURNAL
    // =========================================================================

    /// Drain the change journal.
    pub fn take_changes(&mut self) -> ChangeSet {
        std::mem::take(&mut self.journal)
    }

    /// Put back a drained change set that could not be consumed. Changes
    /// recorded since the drain are folded on top of it.
    pub fn requeue_changes(&mut self, mut drained: ChangeSet) {
        let later = std::mem::take(&mut self.journal);
        drained.merge(later);
        self.journal = drained;
    }

    /// Peek at pending changes without draining.
    pub fn pending_changes(&self) -> &ChangeSet {
        &self.journal
    }

    // =========================================================================
    // RESTORE
    // =========================================================================

    /// Re-insert an atom with a fixed id, as read back from persistence.
    ///
    /// Atoms must arrive in ascending id order so every link finds its
    /// outgoing set already present. The journal is not touched.
    pub(crate) fn restore_atom(
        &mut self,
        id: AtomId,
        kind: AtomKind,
        tv: TruthValue,
        av: AttentionValue,
        tensor: Option<TensorHandle>,
    ) -> Result<(), AtomSpaceError> {
        if let AtomKind::Link { link_type, outgoing } = &kind {
            if outgoing.is_empty() {
                return Err(AtomSpaceError::EmptyOutgoing(*link_type));
            }
            if let Some(&missing) = outgoing.iter().find(|o| !self.contains(**o)) {
                return Err(AtomSpaceError::UnknownAtom(missing));
            }
        }

        match &kind {
            AtomKind::Node { node_type, name } => {
                self.node_index.insert((*node_type, name.clone()), id);
                self.by_name.entry(name.clone()).or_default().insert(id);
            }
            AtomKind::Link { link_type, outgoing } => {
                self.link_index.insert((*link_type, outgoing.clone()), id);
                for &target in outgoing {
                    if let Some(t) = self.slot_mut(target) {
                        t.incoming.insert(id);
                    }
                }
            }
        }

        let mut atom = Atom::new(id, kind);
        atom.tv = tv.clamped();
        atom.av = av;
        atom.tensor = tensor;

        let idx = id.0 as usize;
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, None);
        }
        self.by_type.entry(atom.atom_type()).or_default().insert(id);
        self.slots[idx] = Some(atom);
        self.live += 1;
        self.next_id = self.next_id.max(id.0 + 1);
        Ok(())
    }

    /// Raise the id counter (never lowers it).
    pub(crate) fn bump_next_id(&mut self, next: u64) {
        self.next_id = self.next_id.max(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv(s: f64, c: f64) -> TruthValue {
        TruthValue::new(s, c)
    }

    #[test]
    fn test_ids_are_monotonic_and_nodes_dedup() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "cat");
        let b = space.add_node(NodeType::Concept, "animal");
        assert!(b > a);
        assert_eq!(space.add_node(NodeType::Concept, "cat"), a);
        // Same name, different type is a different node
        let p = space.add_node(NodeType::Predicate, "cat");
        assert_ne!(p, a);
        assert_eq!(space.find_by_name("cat"), vec![a, p]);
        assert_eq!(space.len(), 3);
    }

    #[test]
    fn test_add_link_rejects_unknown_atom() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let err = space
            .add_link(LinkType::Inheritance, vec![a, AtomId(99)])
            .unwrap_err();
        assert_eq!(err, AtomSpaceError::UnknownAtom(AtomId(99)));
        assert_eq!(space.len(), 1);
        assert!(space.incoming(a).is_empty());
    }

    #[test]
    fn test_add_link_rejects_empty_outgoing() {
        let mut space = AtomSpace::new();
        let err = space.add_link(LinkType::List, Vec::new()).unwrap_err();
        assert_eq!(err, AtomSpaceError::EmptyOutgoing(LinkType::List));
    }

    #[test]
    fn test_incoming_is_inverse_of_outgoing() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let b = space.add_node(NodeType::Concept, "b");
        let ab = space.add_link(LinkType::Implication, vec![a, b]).unwrap();
        let aa = space.add_link(LinkType::List, vec![a, a]).unwrap();

        assert_eq!(space.incoming(a), vec![ab, aa]);
        assert_eq!(space.incoming(b), vec![ab]);
        assert_eq!(space.outgoing(ab), &[a, b]);
        assert_eq!(space.incoming_by_type(a, LinkType::List), vec![aa]);

        // Identical link dedups
        assert_eq!(space.add_link(LinkType::Implication, vec![a, b]).unwrap(), ab);
    }

    #[test]
    fn test_truth_value_clamped_on_write() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let raw = TruthValue {
            strength: 1.5,
            confidence: -3.0,
        };
        assert!(space.set_truth_value(a, raw));
        assert_eq!(space.truth_value(a), Some(tv(1.0, 0.0)));
        assert!(!space.set_truth_value(AtomId(42), raw));
    }

    #[test]
    fn test_remove_requires_recursive_when_referenced() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let b = space.add_node(NodeType::Concept, "b");
        let ab = space.add_link(LinkType::Implication, vec![a, b]).unwrap();
        let not_ab = space.add_link(LinkType::Not, vec![ab]).unwrap();

        assert!(space.remove(a, false).is_none());
        let removed = space.remove(a, true).unwrap();
        let ids: Vec<AtomId> = removed.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![not_ab, ab, a]);
        assert!(space.incoming(b).is_empty());
        assert!(space.find_link(LinkType::Implication, &[a, b]).is_none());
        assert_eq!(space.len(), 1);

        // Ids are not reused after removal
        let c = space.add_node(NodeType::Concept, "c");
        assert!(c > not_ab);
    }

    #[test]
    fn test_find_by_type() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let b = space.add_node(NodeType::Concept, "b");
        let ab = space.add_link(LinkType::Implication, vec![a, b]).unwrap();
        assert_eq!(space.find_by_type(NodeType::Concept), vec![a, b]);
        assert_eq!(space.find_by_type(LinkType::Implication), vec![ab]);
        assert!(space.find_by_type(LinkType::Or).is_empty());
    }

    #[test]
    fn test_tensor_shape_guard() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        assert_eq!(space.attach_tensor(a, TensorHandle::new(1, vec![4, 8])), Ok(None));
        let err = space
            .attach_tensor(a, TensorHandle::new(2, vec![8, 4]))
            .unwrap_err();
        assert!(matches!(err, AtomSpaceError::ShapeMismatch { .. }));
        let prev = space.attach_tensor(a, TensorHandle::new(3, vec![4, 8])).unwrap();
        assert_eq!(prev.map(|h| h.tensor_id), Some(1));
        assert_eq!(
            space.attach_tensor(AtomId(77), TensorHandle::new(1, vec![1])),
            Err(AtomSpaceError::UnknownAtom(AtomId(77)))
        );
    }

    #[test]
    fn test_journal_tracks_changes() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let b = space.add_node(NodeType::Concept, "b");
        space.take_changes();

        let ab = space.add_link(LinkType::Implication, vec![a, b]).unwrap();
        space.set_truth_value(a, tv(0.5, 0.5));
        let changes = space.take_changes();
        assert!(changes.created.contains(&ab));
        assert!(changes.truth.contains(&a));
        assert!(changes.incoming.contains(&a) && changes.incoming.contains(&b));
        assert!(space.take_changes().is_empty());
    }
}
