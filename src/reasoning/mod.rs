//! Reasoning orchestrator: forward and backward chaining over the AtomSpace.
//!
//! ```text
//! Idle ──► Selecting ──► Applying ──► Committing ──┐
//!  ▲          (focus)     (cache/PLN)   (write/inv) │
//!  └──────────────── fixed point / steps / time ◄───┘
//! ```
//!
//! Every rule application goes through the [`InferenceCache`]; every
//! committed truth value invalidates the cache entries that read it.
//!
//! [`InferenceCache`]: crate::cache::InferenceCache

mod backward;
mod forward;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use backward::{BackwardChainer, Proof};
pub use forward::ForwardChainer;

use crate::pln::RuleKind;
use crate::{AtomId, LinkType, TruthValue};

/// Forward/backward chaining parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    /// Upper bound on forward-chaining steps per run.
    pub max_steps: usize,
    /// Wall-clock budget per run, checked once per step.
    pub time_limit: Option<Duration>,
    /// Restrict premise selection to the top-k attentional focus. `None`
    /// considers every candidate link.
    pub focus_size: Option<usize>,
    /// Results below this confidence are dropped.
    pub min_confidence: f64,
    /// An existing conclusion is only rewritten when the new confidence beats
    /// the stored one by more than this.
    pub min_confidence_gain: f64,
    /// Sti granted to each newly created conclusion.
    pub conclusion_stimulus: f64,
    /// Rules applied per premise link, in this order.
    pub rules: Vec<RuleKind>,
    /// Maximum chain length explored by backward chaining.
    pub backward_max_depth: usize,
    /// Sub-goals expanded per backward step; more are sampled.
    pub backward_branching: usize,
    /// Seed for the backward chainer's sampler.
    pub seed: u64,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            time_limit: None,
            focus_size: None,
            min_confidence: 0.01,
            min_confidence_gain: 1e-6,
            conclusion_stimulus: 0.0,
            rules: vec![
                RuleKind::Deduction,
                RuleKind::Induction,
                RuleKind::Abduction,
                RuleKind::ModusPonens,
                RuleKind::Conjunction,
                RuleKind::Disjunction,
                RuleKind::Negation,
            ],
            backward_max_depth: 3,
            backward_branching: 8,
            seed: 0x5eed,
        }
    }
}

/// Forward-chaining phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Selecting,
    Applying,
    Committing,
}

/// What an inference concludes about.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Conclusion {
    /// An atom that already exists.
    Atom(AtomId),
    /// A link that is created on commit if it does not exist yet.
    Link {
        link_type: LinkType,
        outgoing: Vec<AtomId>,
    },
}

/// One rule application.
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceResult {
    pub conclusion: Conclusion,
    pub rule: RuleKind,
    pub truth_value: TruthValue,
    pub confidence: f64,
    pub premises_used: Vec<AtomId>,
}

/// Why a forward-chaining run stopped. None of these is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// A step committed nothing.
    FixedPoint,
    StepsExhausted,
    TimeLimit,
}

/// Result of [`ForwardChainer::run`].
#[derive(Clone, Debug)]
pub struct ChainOutcome {
    pub steps: usize,
    /// Every result kept across all steps, in production order.
    pub results: Vec<InferenceResult>,
    /// Atoms whose truth value was written, in commit order.
    pub committed: Vec<AtomId>,
    /// Conclusion links created by this run.
    pub created: Vec<AtomId>,
    pub termination: Termination,
}
