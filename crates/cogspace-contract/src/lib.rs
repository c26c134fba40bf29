//! `cogspace-contract`: substrate types for the cogspace hypergraph.
//!
//! This crate contains the pure data types shared by the store, the attention
//! economy, the truth-value calculus and any persistence backend. It has no
//! I/O, no storage, no logging. Just types, arithmetic and serde.
//!
//! ## What's included
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`id`] | `AtomId(u64)`: monotonic atom identity + big-endian key bytes |
//! | [`atom_type`] | `NodeType`, `LinkType`, `AtomType` closed type tags |
//! | [`truth`] | `TruthValue` (strength, confidence) + evidence-count conversions |
//! | [`attention`] | `AttentionValue` (sti, lti, vlti) |
//! | [`tensor`] | `TensorHandle`: opaque tensor attachment |
//! | [`family`] | `ColumnFamily`: persistence partitioning |

pub mod atom_type;
pub mod attention;
pub mod family;
pub mod id;
pub mod tensor;
pub mod truth;

// === Convenience re-exports ===
pub use atom_type::{AtomType, LinkType, NodeType};
pub use attention::AttentionValue;
pub use family::ColumnFamily;
pub use id::AtomId;
pub use tensor::TensorHandle;
pub use truth::{clamp_unit, TruthValue, DEFAULT_K};
