//! PLN Inference Rules
//!
//! Type-safe inference rules that can be composed and applied, plus the
//! [`RuleKind`] tag the reasoners dispatch on.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::formulas;
use crate::TruthValue;

/// Every rule the calculus knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Deduction,
    Induction,
    Abduction,
    Revision,
    ModusPonens,
    Conjunction,
    Disjunction,
    Negation,
    Chain,
}

impl RuleKind {
    pub const ALL: [RuleKind; 9] = [
        RuleKind::Deduction,
        RuleKind::Induction,
        RuleKind::Abduction,
        RuleKind::Revision,
        RuleKind::ModusPonens,
        RuleKind::Conjunction,
        RuleKind::Disjunction,
        RuleKind::Negation,
        RuleKind::Chain,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Deduction => Deduction::name(),
            RuleKind::Induction => Induction::name(),
            RuleKind::Abduction => Abduction::name(),
            RuleKind::Revision => Revision::name(),
            RuleKind::ModusPonens => ModusPonens::name(),
            RuleKind::Conjunction => Conjunction::name(),
            RuleKind::Disjunction => Disjunction::name(),
            RuleKind::Negation => Negation::name(),
            RuleKind::Chain => "chain",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for inference rules
pub trait InferenceRule {
    /// Apply the rule to its premise truth values, in the rule's documented
    /// order. `None` when the premise count is wrong.
    fn apply(premises: &[TruthValue]) -> Option<TruthValue>;

    /// Name of the rule
    fn name() -> &'static str;

    /// Description of what this rule does
    fn description() -> &'static str;
}

/// Deduction: A→B, B→C ⊢ A→C
///
/// Premises `[AB, BC, B]`, or `[AB, BC, B, C]` when the conclusion term's
/// truth value is known.
pub struct Deduction;

impl InferenceRule for Deduction {
    fn apply(premises: &[TruthValue]) -> Option<TruthValue> {
        match premises {
            [ab, bc, b] => Some(formulas::deduction(ab, bc, b)),
            [ab, bc, b, c] => Some(formulas::deduction_with_term(ab, bc, b, c)),
            _ => None,
        }
    }

    fn name() -> &'static str {
        "deduction"
    }

    fn description() -> &'static str {
        "A→B, B→C ⊢ A→C (forward chaining)"
    }
}

/// Induction: A→B, A→C ⊢ B→C
///
/// Premises `[AB, AC, A]`.
pub struct Induction;

impl InferenceRule for Induction {
    fn apply(premises: &[TruthValue]) -> Option<TruthValue> {
        match premises {
            [ab, ac, a] => Some(formulas::induction(ab, ac, a)),
            _ => None,
        }
    }

    fn name() -> &'static str {
        "induction"
    }

    fn description() -> &'static str {
        "A→B, A→C ⊢ B→C (generalization)"
    }
}

/// Abduction: A→C, B→C ⊢ A→B
///
/// Premises `[AC, BC, C]`.
pub struct Abduction;

impl InferenceRule for Abduction {
    fn apply(premises: &[TruthValue]) -> Option<TruthValue> {
        match premises {
            [ac, bc, c] => Some(formulas::abduction(ac, bc, c)),
            _ => None,
        }
    }

    fn name() -> &'static str {
        "abduction"
    }

    fn description() -> &'static str {
        "A→C, B→C ⊢ A→B (shared effect)"
    }
}

/// Revision over any number of independent estimates.
pub struct Revision;

impl InferenceRule for Revision {
    fn apply(premises: &[TruthValue]) -> Option<TruthValue> {
        Some(formulas::combine(premises))
    }

    fn name() -> &'static str {
        "revision"
    }

    fn description() -> &'static str {
        "S<tv1>, S<tv2> ⊢ S<merged> (evidence pooling)"
    }
}

/// Modus ponens: A, A→B ⊢ B
///
/// Premises `[A, AB]`.
pub struct ModusPonens;

impl InferenceRule for ModusPonens {
    fn apply(premises: &[TruthValue]) -> Option<TruthValue> {
        match premises {
            [a, ab] => Some(formulas::modus_ponens(a, ab)),
            _ => None,
        }
    }

    fn name() -> &'static str {
        "modus_ponens"
    }

    fn description() -> &'static str {
        "A, A→B ⊢ B (detachment)"
    }
}

/// Conjunction over one or more members.
pub struct Conjunction;

impl InferenceRule for Conjunction {
    fn apply(premises: &[TruthValue]) -> Option<TruthValue> {
        if premises.is_empty() {
            return None;
        }
        Some(formulas::conjunction_all(premises))
    }

    fn name() -> &'static str {
        "conjunction"
    }

    fn description() -> &'static str {
        "A, B ⊢ A∧B (independence)"
    }
}

/// Disjunction over one or more members.
pub struct Disjunction;

impl InferenceRule for Disjunction {
    fn apply(premises: &[TruthValue]) -> Option<TruthValue> {
        if premises.is_empty() {
            return None;
        }
        Some(formulas::disjunction_all(premises))
    }

    fn name() -> &'static str {
        "disjunction"
    }

    fn description() -> &'static str {
        "A, B ⊢ A∨B (independence)"
    }
}

/// Negation of a single premise.
pub struct Negation;

impl InferenceRule for Negation {
    fn apply(premises: &[TruthValue]) -> Option<TruthValue> {
        match premises {
            [a] => Some(formulas::negation(a)),
            _ => None,
        }
    }

    fn name() -> &'static str {
        "negation"
    }

    fn description() -> &'static str {
        "A ⊢ ¬A"
    }
}

/// Apply an inference rule by kind.
///
/// `Chain` takes links interleaved with their middle terms,
/// `[L1, T1, L2, T2, …, Ln]`, so its premise count must be odd.
pub fn apply_rule(kind: RuleKind, premises: &[TruthValue]) -> Option<TruthValue> {
    match kind {
        RuleKind::Deduction => Deduction::apply(premises),
        RuleKind::Induction => Induction::apply(premises),
        RuleKind::Abduction => Abduction::apply(premises),
        RuleKind::Revision => Revision::apply(premises),
        RuleKind::ModusPonens => ModusPonens::apply(premises),
        RuleKind::Conjunction => Conjunction::apply(premises),
        RuleKind::Disjunction => Disjunction::apply(premises),
        RuleKind::Negation => Negation::apply(premises),
        RuleKind::Chain => {
            if premises.len() % 2 == 0 {
                return None;
            }
            let links: Vec<TruthValue> = premises.iter().step_by(2).copied().collect();
            let terms: Vec<TruthValue> = premises.iter().skip(1).step_by(2).copied().collect();
            Some(formulas::chain(&links, &terms))
        }
    }
}
