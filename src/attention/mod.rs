//! ECAN: economic attention allocation.
//!
//! Attention is money. The [`AttentionBank`] holds two fixed currencies,
//! short-term importance (sti) and long-term importance (lti). Every unit is
//! either in the bank's available pool or on some atom:
//!
//! ```text
//! available_sti + Σ atom.sti = total_sti
//! available_lti + Σ atom.lti = total_lti
//! ```
//!
//! | Operation | Flow |
//! |-----------|------|
//! | `stimulate` | pool → atom (sti, plus an lti wage) |
//! | `spread_activation` | atom → neighbours, weighted by link `s × c` |
//! | `collect_rent` | atom → pool, proportional to lti |
//! | `forget` | removed atom's residue → pool |
//!
//! Nothing else may move sti or lti. [`AtomSpace::set_attention_value`]
//! is a raw write and bypasses the ledger; use
//! [`AttentionBank::set_attention_value`] instead.
//!
//! [`AtomSpace::set_attention_value`]: crate::AtomSpace::set_attention_value

mod bank;
mod config;

pub use bank::{AttentionBank, EcanCycleReport};
pub use config::EcanConfig;
