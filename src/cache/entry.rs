use std::collections::BTreeSet;
use std::time::Instant;

use crate::pln::RuleKind;
use crate::{AtomId, TruthValue};

/// Rule plus ordered premise ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub rule: RuleKind,
    pub premises: Vec<AtomId>,
}

impl CacheKey {
    pub fn new(rule: RuleKind, premises: impl Into<Vec<AtomId>>) -> Self {
        Self {
            rule,
            premises: premises.into(),
        }
    }
}

/// A computed inference. `conclusion` is `None` when the conclusion atom
/// did not exist yet when the value was computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CachedInference {
    pub conclusion: Option<AtomId>,
    pub truth_value: TruthValue,
}

impl CachedInference {
    pub fn new(conclusion: Option<AtomId>, truth_value: TruthValue) -> Self {
        Self {
            conclusion,
            truth_value,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub(crate) key: CacheKey,
    /// `None` records that the rule produced nothing for these premises.
    pub(crate) result: Option<CachedInference>,
    pub(crate) deps: BTreeSet<AtomId>,
    pub(crate) created_at: Instant,
    pub(crate) last_access: Instant,
    pub(crate) access_count: u64,
    /// Monotonic access stamp; orders LRU eviction.
    pub(crate) tick: u64,
}

impl CacheEntry {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn result(&self) -> Option<CachedInference> {
        self.result
    }

    pub fn deps(&self) -> &BTreeSet<AtomId> {
        &self.deps
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_access(&self) -> Instant {
        self.last_access
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }
}
