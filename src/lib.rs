//! # cogspace
//!
//! Hypergraph knowledge store with economic attention allocation and cached
//! probabilistic inference.
//!
//! ## Quick Start
//! ```rust,ignore
//! use cogspace::{CogEngine, CogConfig, LinkType, NodeType, TruthValue};
//!
//! let mut engine = CogEngine::new(CogConfig::default());
//! let space = engine.space_mut();
//! let cat = space.add_node(NodeType::Concept, "cat");
//! let mammal = space.add_node(NodeType::Concept, "mammal");
//! let animal = space.add_node(NodeType::Concept, "animal");
//! space.add_link_with_tv(LinkType::Implication, vec![cat, mammal], TruthValue::new(0.9, 0.8))?;
//! space.add_link_with_tv(LinkType::Implication, vec![mammal, animal], TruthValue::new(0.95, 0.9))?;
//!
//! engine.stimulate(cat, 100.0);
//! engine.run_ecan_cycle()?;
//! let outcome = engine.run_pass()?;
//! println!("{} conclusions, {:?}", outcome.results.len(), outcome.termination);
//! ```
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          COGSPACE                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │   AttentionBank ── focus ──► ForwardChainer / BackwardChainer    │
//! │        │                          │                              │
//! │   stimulate/spread/rent/forget    ├──► InferenceCache ──► PLN     │
//! │        │                          │                              │
//! │        ▼                          ▼                              │
//! │   AtomSpace (arena + indices + change journal)                   │
//! │        │                                                         │
//! │        ▼  one WriteBatch per cycle / pass                        │
//! │   KvStore (column families, big-endian keys, JSON values)        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![allow(clippy::new_without_default, clippy::len_without_is_empty)]

// === Core modules ===
pub mod atomspace;
pub mod attention;
pub mod cache;
pub mod config;
pub mod engine;
pub mod persist;
pub mod pln;
pub mod reasoning;

// === Re-exports for convenience ===

// Contract types
pub use cogspace_contract::{
    AtomId, AtomType, AttentionValue, ColumnFamily, LinkType, NodeType, TensorHandle, TruthValue,
};

// Store
pub use crate::atomspace::{Atom, AtomKind, AtomSpace, AtomSpaceError, ChangeSet, RemovedAtom};

// ECAN
pub use crate::attention::{AttentionBank, EcanConfig, EcanCycleReport};

// PLN
pub use crate::pln::{apply_rule, RuleKind};

// Cache
pub use crate::cache::{CacheConfig, CacheKey, CacheStats, CachedInference, InferenceCache};

// Reasoning
pub use crate::reasoning::{
    BackwardChainer, ChainOutcome, Conclusion, ForwardChainer, InferenceResult, Phase, Proof,
    ReasonerConfig, Termination,
};

// Persistence
pub use crate::persist::{KvStore, MemoryStore, PersistError, WriteBatch};

// Facade
pub use crate::config::CogConfig;
pub use crate::engine::CogEngine;

// === Error types ===

/// Crate-level error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("AtomSpace error: {0}")]
    AtomSpace(#[from] AtomSpaceError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// === Constants ===

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
