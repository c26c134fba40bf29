//! AtomSpace: the hypergraph store.
//!
//! Nodes and links live in a dense arena indexed by [`AtomId`]. Every other
//! structure is an index over that arena:
//!
//! ```text
//! slots[id]        → Atom { kind, tv, av, tensor, incoming }
//! by_type[type]    → BTreeSet<AtomId>
//! by_name[name]    → BTreeSet<AtomId>
//! node_index       → (NodeType, name)     → AtomId   (dedup)
//! link_index       → (LinkType, outgoing) → AtomId   (dedup)
//! ```
//!
//! `incoming` is never an owning back-pointer: it is derived from the
//! canonical outgoing lists and updated incrementally on link creation and
//! removal.
//!
//! Referential integrity is the only hard failure: a link naming an absent
//! atom is rejected with [`AtomSpaceError::UnknownAtom`].

mod atom;
mod debug_text;
mod journal;
mod store;

pub use atom::{Atom, AtomKind};
pub use debug_text::format_number;
pub use journal::ChangeSet;
pub use store::AtomSpace;

/// An atom as handed back by removal, with its final truth and attention.
pub type RemovedAtom = Atom;

use crate::{AtomId, LinkType};

/// Errors raised at the AtomSpace boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AtomSpaceError {
    #[error("unknown atom {0}")]
    UnknownAtom(AtomId),

    #[error("{} needs at least one outgoing atom", .0.name())]
    EmptyOutgoing(LinkType),

    #[error("tensor shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
}
