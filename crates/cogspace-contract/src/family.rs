//! Column families used by persistence backends.
//!
//! Every family is keyed by [`AtomId::to_key`](crate::AtomId::to_key) except
//! `Metadata`, which uses short ASCII keys.

use serde::{Deserialize, Serialize};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnFamily {
    /// Tensor handles attached to atoms.
    Default = 0,
    Nodes = 1,
    Links = 2,
    Incoming = 3,
    Outgoing = 4,
    Attention = 5,
    TruthValues = 6,
    Metadata = 7,
}

impl ColumnFamily {
    pub const ALL: [ColumnFamily; 8] = [
        ColumnFamily::Default,
        ColumnFamily::Nodes,
        ColumnFamily::Links,
        ColumnFamily::Incoming,
        ColumnFamily::Outgoing,
        ColumnFamily::Attention,
        ColumnFamily::TruthValues,
        ColumnFamily::Metadata,
    ];

    /// Families that hold one record per atom.
    pub const PER_ATOM: [ColumnFamily; 6] = [
        ColumnFamily::Nodes,
        ColumnFamily::Links,
        ColumnFamily::Incoming,
        ColumnFamily::Outgoing,
        ColumnFamily::Attention,
        ColumnFamily::TruthValues,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColumnFamily::Default => "default",
            ColumnFamily::Nodes => "nodes",
            ColumnFamily::Links => "links",
            ColumnFamily::Incoming => "incoming",
            ColumnFamily::Outgoing => "outgoing",
            ColumnFamily::Attention => "attention",
            ColumnFamily::TruthValues => "truth_values",
            ColumnFamily::Metadata => "metadata",
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}
