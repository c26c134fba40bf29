//! CogEngine: the facade a scheduler drives.
//!
//! Owns the AtomSpace, the AttentionBank, the InferenceCache and both
//! chainers. Each public unit of work (`run_ecan_cycle`, `run_pass`,
//! `backward_chain`) ends with [`sync`](CogEngine::sync): the change journal
//! is drained once, stale cache entries are invalidated, and, when a store is
//! attached, one [`WriteBatch`](crate::WriteBatch) is written.

use tracing::{debug, info, warn};

use crate::attention::{AttentionBank, EcanCycleReport};
use crate::cache::InferenceCache;
use crate::config::CogConfig;
use crate::persist::{self, KvStore, MemoryStore};
use crate::reasoning::{BackwardChainer, ChainOutcome, ForwardChainer, Proof};
use crate::{AtomId, AtomSpace, AttentionValue, RemovedAtom, Result};

pub struct CogEngine<S: KvStore = MemoryStore> {
    config: CogConfig,
    space: AtomSpace,
    bank: AttentionBank,
    cache: InferenceCache,
    forward: ForwardChainer,
    backward: BackwardChainer,
    store: Option<S>,
}

impl CogEngine<MemoryStore> {
    /// An in-memory engine with no persistence.
    pub fn new(config: CogConfig) -> Self {
        Self::assemble(config, AtomSpace::new(), None)
    }
}

impl<S: KvStore> CogEngine<S> {
    fn assemble(config: CogConfig, mut space: AtomSpace, store: Option<S>) -> Self {
        let bank = AttentionBank::for_space(config.ecan.clone(), &mut space);
        Self {
            bank,
            cache: InferenceCache::new(config.cache.clone()),
            forward: ForwardChainer::new(config.reasoner.clone()),
            backward: BackwardChainer::new(config.reasoner.clone()),
            space,
            store,
            config,
        }
    }

    /// An empty engine persisting into `store`.
    pub fn with_store(config: CogConfig, store: S) -> Self {
        Self::assemble(config, AtomSpace::new(), Some(store))
    }

    /// Restore the AtomSpace held in `store` and keep persisting into it.
    pub fn open(config: CogConfig, store: S) -> Result<Self> {
        let space = persist::restore(&store)?;
        info!(atoms = space.len(), "engine opened from store");
        Ok(Self::assemble(config, space, Some(store)))
    }

    pub fn config(&self) -> &CogConfig {
        &self.config
    }

    pub fn space(&self) -> &AtomSpace {
        &self.space
    }

    /// Direct store access for building knowledge. Truth-value edits made
    /// here are picked up by the next [`sync`](Self::sync). Attention must go
    /// through [`stimulate`](Self::stimulate) or
    /// [`set_attention_value`](Self::set_attention_value) to stay conserved.
    pub fn space_mut(&mut self) -> &mut AtomSpace {
        &mut self.space
    }

    pub fn bank(&self) -> &AttentionBank {
        &self.bank
    }

    pub fn cache(&self) -> &InferenceCache {
        &self.cache
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    pub fn into_store(self) -> Option<S> {
        self.store
    }

    // =========================================================================
    // ATTENTION
    // =========================================================================

    pub fn stimulate(&mut self, atom: AtomId, amount: f64) -> f64 {
        self.bank.stimulate(&mut self.space, atom, amount)
    }

    pub fn set_attention_value(&mut self, atom: AtomId, av: AttentionValue) -> Option<AttentionValue> {
        self.bank.set_attention_value(&mut self.space, atom, av)
    }

    pub fn attentional_focus(&self, k: usize) -> Vec<AtomId> {
        self.bank.attentional_focus(&self.space, k)
    }

    /// Remove an atom, returning its residual attention (and that of any
    /// links removed with it) to the bank.
    pub fn remove(&mut self, atom: AtomId, recursive: bool) -> Result<Option<Vec<RemovedAtom>>> {
        let removed = self.space.remove(atom, recursive);
        if let Some(atoms) = &removed {
            self.bank.reclaim(atoms);
        }
        self.sync()?;
        Ok(removed)
    }

    // =========================================================================
    // SCHEDULER UNITS
    // =========================================================================

    /// One ECAN cycle: spread, rent, forget.
    pub fn run_ecan_cycle(&mut self) -> Result<EcanCycleReport> {
        self.sync()?;
        let report = self.bank.run_cycle(&mut self.space);
        self.sync()?;
        info!(
            spread = report.spread,
            rent = report.rent,
            forgotten = report.forgotten.len(),
            "ecan cycle"
        );
        Ok(report)
    }

    /// One forward-chaining pass.
    pub fn run_pass(&mut self) -> Result<ChainOutcome> {
        self.sync()?;
        let outcome = self
            .forward
            .run(&mut self.space, &mut self.bank, &mut self.cache);
        self.sync()?;
        Ok(outcome)
    }

    /// Prove `target` and write the result back if it dominates.
    pub fn backward_chain(&mut self, target: AtomId) -> Result<Option<Proof>> {
        self.sync()?;
        let proof = self
            .backward
            .prove_and_commit(&mut self.space, &mut self.cache, target);
        self.sync()?;
        Ok(proof)
    }

    /// Drain the change journal: invalidate dependent cache entries and
    /// persist one batch. Host edits made through
    /// [`space_mut`](Self::space_mut) are flushed as their own batch.
    ///
    /// If the batch cannot be built or written the drained changes go back
    /// into the journal, so the next successful sync still persists them.
    pub fn sync(&mut self) -> Result<()> {
        let changes = self.space.take_changes();
        if changes.is_empty() {
            return Ok(());
        }
        let invalidated = self.cache.invalidate_many(changes.invalidating());
        let Some(store) = self.store.as_mut() else {
            debug!(invalidated, "synced");
            return Ok(());
        };

        let written = persist::batch_for_changes(&self.space, &changes).and_then(|batch| {
            let ops = batch.len();
            store.write(batch).map(|()| ops)
        });
        match written {
            Ok(ops) => {
                debug!(ops, invalidated, "synced");
                Ok(())
            }
            Err(err) => {
                warn!(%err, "sync failed, changes requeued");
                self.space.requeue_changes(changes);
                Err(err.into())
            }
        }
    }

    /// AtomSpace text, then the bank and cache lines.
    pub fn to_debug_text(&self) -> String {
        let mut out = self.space.to_debug_text();
        out.push_str(&self.bank.to_debug_text());
        out.push('\n');
        out.push_str(&self.cache.stats().to_debug_text());
        out.push('\n');
        out
    }
}
