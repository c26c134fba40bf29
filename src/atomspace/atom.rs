//! Atom records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{AtomId, AtomType, AttentionValue, LinkType, NodeType, TensorHandle, TruthValue};

/// Node or link payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AtomKind {
    Node { node_type: NodeType, name: String },
    Link { link_type: LinkType, outgoing: Vec<AtomId> },
}

/// One atom as stored in the arena.
///
/// Fields are only writable through [`AtomSpace`](super::AtomSpace) so that
/// the indices and the change journal stay in step.
#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    pub(crate) id: AtomId,
    pub(crate) kind: AtomKind,
    pub(crate) tv: TruthValue,
    pub(crate) av: AttentionValue,
    pub(crate) tensor: Option<TensorHandle>,
    pub(crate) incoming: BTreeSet<AtomId>,
}

impl Atom {
    pub(crate) fn new(id: AtomId, kind: AtomKind) -> Self {
        Self {
            id,
            kind,
            tv: TruthValue::default(),
            av: AttentionValue::zero(),
            tensor: None,
            incoming: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> AtomId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> &AtomKind {
        &self.kind
    }

    pub fn atom_type(&self) -> AtomType {
        match &self.kind {
            AtomKind::Node { node_type, .. } => AtomType::Node(*node_type),
            AtomKind::Link { link_type, .. } => AtomType::Link(*link_type),
        }
    }

    #[inline]
    pub fn truth_value(&self) -> TruthValue {
        self.tv
    }

    #[inline]
    pub fn attention_value(&self) -> AttentionValue {
        self.av
    }

    pub fn tensor(&self) -> Option<&TensorHandle> {
        self.tensor.as_ref()
    }

    pub fn is_node(&self) -> bool {
        matches!(self.kind, AtomKind::Node { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, AtomKind::Link { .. })
    }

    /// Node name, `None` for links.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            AtomKind::Node { name, .. } => Some(name),
            AtomKind::Link { .. } => None,
        }
    }

    /// Link type, `None` for nodes.
    pub fn link_type(&self) -> Option<LinkType> {
        match &self.kind {
            AtomKind::Link { link_type, .. } => Some(*link_type),
            AtomKind::Node { .. } => None,
        }
    }

    /// Outgoing set; empty for nodes.
    pub fn outgoing(&self) -> &[AtomId] {
        match &self.kind {
            AtomKind::Link { outgoing, .. } => outgoing,
            AtomKind::Node { .. } => &[],
        }
    }

    /// Links that contain this atom, ascending id.
    pub fn incoming(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.incoming.iter().copied()
    }

    pub fn incoming_len(&self) -> usize {
        self.incoming.len()
    }
}
