//! AtomId: 64-bit atom identity.
//!
//! Ids are handed out by the owning store from a monotonic counter and are
//! never reused. Persistence keys are the big-endian bytes of the id, so a
//! lexicographic scan of a column family visits atoms in creation order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an atom inside one store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AtomId(pub u64);

impl AtomId {
    /// Key width in bytes.
    pub const KEY_BYTES: usize = 8;

    /// The raw u64.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Big-endian key bytes (sort order == id order).
    #[inline]
    pub fn to_key(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decode a key produced by [`AtomId::to_key`]. Returns `None` for keys of
    /// the wrong width.
    pub fn from_key(key: &[u8]) -> Option<Self> {
        let bytes: [u8; 8] = key.try_into().ok()?;
        Some(AtomId(u64::from_be_bytes(bytes)))
    }
}

impl fmt::Debug for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AtomId {
    fn from(raw: u64) -> Self {
        AtomId(raw)
    }
}
