//! Persistence: column-family key/value contract, in-memory reference store,
//! and the AtomSpace ↔ record codec.
//!
//! ## Layout
//! ```text
//! family        key              value (JSON)
//! ──────────────────────────────────────────────────────────────
//! nodes         AtomId (BE u64)  {"node_type": …, "name": …}
//! links         AtomId           {"link_type": …, "outgoing": [...]}
//! outgoing      AtomId           [ids]
//! incoming      AtomId           [ids]
//! truth_values  AtomId           {"strength": …, "confidence": …}
//! attention     AtomId           {"sti": …, "lti": …, "vlti": …}
//! default       AtomId           {"tensor_id": …, "shape": [...]}
//! metadata      b"next_id"       u64
//!               b"committed_at"  RFC 3339 string
//! ```
//!
//! The engine writes one [`WriteBatch`] per committed unit of work, built
//! from the AtomSpace change journal by [`batch_for_changes`].

mod codec;
mod kv;

use crate::ColumnFamily;

pub use codec::{
    batch_for_changes, batch_for_space, restore, LinkRecord, NodeRecord, META_COMMITTED_AT,
    META_NEXT_ID,
};
pub use kv::{BatchOp, KvStore, MemoryStore, Snapshot, WriteBatch};

/// Errors raised by persistence backends and the record codec.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("store is closed")]
    Closed,

    #[error("corrupt record in {}: key {:?}", .family.name(), .key)]
    Corrupt { family: ColumnFamily, key: Vec<u8> },

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
