//! PLN (Probabilistic Logic Networks) truth-value calculus.
//!
//! Every function here is pure and total: truth values in, a clamped truth
//! value out, no error path. Confidence is combined under an independence
//! approximation (products and weighted products of the input confidences),
//! which is a heuristic and not exact probability theory.

mod formulas;
mod rules;

pub use formulas::{
    abduction, chain, combine, conjunction, conjunction_all, deduction, deduction_strength,
    deduction_with_term, disjunction, disjunction_all, implication, induction, modus_ponens,
    modus_tollens, negation, revision, ABDUCTION_DISCOUNT, DEDUCTION_LIMIT, INDUCTION_DISCOUNT,
    MODUS_TOLLENS_DISCOUNT,
};
pub use rules::{
    apply_rule, Abduction, Conjunction, Deduction, Disjunction, Induction, InferenceRule,
    ModusPonens, Negation, Revision, RuleKind,
};
