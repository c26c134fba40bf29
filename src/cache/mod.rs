//! Inference cache with exact dependency invalidation.
//!
//! Every computed inference is stored under a [`CacheKey`] (rule plus ordered
//! premise ids) together with the set of atoms it depends on. A reverse
//! index maps each atom to the keys that read it:
//!
//! ```text
//! entries:  CacheKey → CacheEntry { result, deps, created_at, last_access, … }
//! by_dep:   AtomId   → {CacheKey}
//! ```
//!
//! When an atom's truth value changes, `invalidate(atom)` removes exactly the
//! entries whose dependency set contains it. Capacity is bounded by LRU
//! eviction and staleness by an optional TTL. All writes go through the
//! cache; it never fails.

mod entry;
mod inference;
mod stats;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use entry::{CacheEntry, CacheKey, CachedInference};
pub use inference::InferenceCache;
pub use stats::CacheStats;

/// Cache sizing and expiry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries kept before eviction starts.
    pub max_size: usize,
    /// Entries older than this are dropped on lookup. `None` disables expiry.
    pub ttl: Option<Duration>,
    /// Fraction of entries evicted once `max_size` is exceeded (at least one).
    pub evict_fraction: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 10_000,
            ttl: Some(Duration::from_secs(300)),
            evict_fraction: 0.1,
        }
    }
}

impl CacheConfig {
    /// Small cache without expiry.
    pub fn small() -> Self {
        Self {
            max_size: 1_000,
            ttl: None,
            evict_fraction: 0.1,
        }
    }

    /// Large cache for long-running engines.
    pub fn large() -> Self {
        Self {
            max_size: 1_000_000,
            ttl: Some(Duration::from_secs(3_600)),
            evict_fraction: 0.05,
        }
    }
}
