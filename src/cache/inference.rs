use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::trace;

use super::{CacheConfig, CacheEntry, CacheKey, CacheStats, CachedInference};
use crate::AtomId;

/// Memoized inference results, LRU + TTL bounded, invalidated by dependency.
pub struct InferenceCache {
    config: CacheConfig,

    /// Live entries.
    entries: HashMap<CacheKey, CacheEntry>,

    /// Reverse dependency index: atom → keys that read it.
    by_dep: HashMap<AtomId, HashSet<CacheKey>>,

    /// Access counter (increments on every insert and hit).
    tick: u64,

    stats: CacheStats,
}

impl InferenceCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            by_dep: HashMap::new(),
            tick: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Presence check that touches neither stats nor recency.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    pub fn lookup(&mut self, key: &CacheKey) -> Option<&CacheEntry> {
        self.lookup_at(key, Instant::now())
    }

    /// Look up `key` as of `now`.
    ///
    /// A hit refreshes the entry's recency. An entry older than the TTL is
    /// dropped and counts as both an expiration and a miss.
    pub fn lookup_at(&mut self, key: &CacheKey, now: Instant) -> Option<&CacheEntry> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.misses += 1;
                return None;
            }
            Some(entry) => self.is_expired(entry, now),
        };

        if expired {
            self.remove_entry(key);
            self.stats.expirations += 1;
            self.stats.misses += 1;
            return None;
        }

        self.tick += 1;
        self.stats.hits += 1;
        let tick = self.tick;
        let entry = self.entries.get_mut(key)?;
        entry.last_access = now;
        entry.access_count += 1;
        entry.tick = tick;
        Some(&*entry)
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        match self.config.ttl {
            Some(ttl) => now.saturating_duration_since(entry.created_at) > ttl,
            None => false,
        }
    }

    // =========================================================================
    // INSERT
    // =========================================================================

    pub fn add(
        &mut self,
        key: CacheKey,
        result: Option<CachedInference>,
        deps: impl IntoIterator<Item = AtomId>,
    ) {
        self.add_at(key, result, deps, Instant::now());
    }

    /// Insert (or replace) the entry for `key` as of `now`, then evict the
    /// least recently accessed entries if the cache is over capacity. The
    /// entry just written is never evicted.
    pub fn add_at(
        &mut self,
        key: CacheKey,
        result: Option<CachedInference>,
        deps: impl IntoIterator<Item = AtomId>,
        now: Instant,
    ) {
        if self.entries.contains_key(&key) {
            self.remove_entry(&key);
        }

        self.tick += 1;
        let entry = CacheEntry {
            key: key.clone(),
            result,
            deps: deps.into_iter().collect(),
            created_at: now,
            last_access: now,
            access_count: 0,
            tick: self.tick,
        };
        for dep in &entry.deps {
            self.by_dep.entry(*dep).or_default().insert(key.clone());
        }
        self.entries.insert(key.clone(), entry);

        if self.entries.len() > self.config.max_size {
            self.evict(&key);
        }
    }

    /// Serve `key` from the cache, or compute it with `f` and store the result.
    pub fn get_or_compute<F>(
        &mut self,
        key: CacheKey,
        deps: impl IntoIterator<Item = AtomId>,
        f: F,
    ) -> Option<CachedInference>
    where
        F: FnOnce() -> Option<CachedInference>,
    {
        if let Some(entry) = self.lookup(&key) {
            return entry.result();
        }
        let result = f();
        self.add(key, result, deps);
        result
    }

    fn evict(&mut self, protect: &CacheKey) {
        let len = self.entries.len();
        let fraction = if self.config.evict_fraction.is_finite() {
            self.config.evict_fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let count = ((len as f64 * fraction).floor() as usize).max(1);

        let mut order: Vec<(u64, CacheKey)> = self
            .entries
            .iter()
            .filter(|(k, _)| *k != protect)
            .map(|(k, e)| (e.tick, k.clone()))
            .collect();
        order.sort_unstable_by_key(|(tick, _)| *tick);

        for (_, key) in order.into_iter().take(count) {
            self.remove_entry(&key);
            self.stats.evictions += 1;
        }
        trace!(count, len = self.entries.len(), "cache eviction");
    }

    fn remove_entry(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        for dep in &entry.deps {
            if let Some(keys) = self.by_dep.get_mut(dep) {
                keys.remove(key);
                if keys.is_empty() {
                    self.by_dep.remove(dep);
                }
            }
        }
        Some(entry)
    }

    // =========================================================================
    // INVALIDATION
    // =========================================================================

    /// Drop exactly the entries that depend on `atom`. Returns how many.
    pub fn invalidate(&mut self, atom: AtomId) -> usize {
        let Some(keys) = self.by_dep.remove(&atom) else {
            return 0;
        };
        let mut removed = 0;
        for key in keys {
            if self.remove_entry(&key).is_some() {
                removed += 1;
            }
        }
        self.stats.invalidations += removed as u64;
        removed
    }

    pub fn invalidate_many(&mut self, atoms: impl IntoIterator<Item = AtomId>) -> usize {
        atoms.into_iter().map(|a| self.invalidate(a)).sum()
    }

    /// Drop everything. The prior size counts as invalidations.
    pub fn invalidate_all(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.by_dep.clear();
        self.stats.invalidations += removed as u64;
        removed
    }

    /// Drop every entry older than the TTL as of `now`.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<CacheKey> = self
            .entries
            .values()
            .filter(|e| self.is_expired(e, now))
            .map(|e| e.key.clone())
            .collect();
        for key in &expired {
            self.remove_entry(key);
        }
        self.stats.expirations += expired.len() as u64;
        expired.len()
    }

    // =========================================================================
    // STATS
    // =========================================================================

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            ..self.stats
        }
    }

    pub fn hit_rate(&self) -> f64 {
        self.stats.hit_rate()
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }
}
