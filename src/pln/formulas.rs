//! PLN truth functions.

use crate::TruthValue;

/// Above this middle-term strength deduction uses the plain product form.
pub const DEDUCTION_LIMIT: f64 = 0.9999;

/// Confidence discount applied by induction.
pub const INDUCTION_DISCOUNT: f64 = 0.5;

/// Confidence discount applied by abduction.
pub const ABDUCTION_DISCOUNT: f64 = 0.3;

/// Confidence discount applied by modus tollens.
pub const MODUS_TOLLENS_DISCOUNT: f64 = 0.8;

/// Independence-based deduction strength.
///
/// `sAB·sBC + (1−sAB)(sC − sB·sBC)/(1 − sB)`, collapsing to `sAB·sBC` when
/// `sB ≥ DEDUCTION_LIMIT`. Unclamped.
pub fn deduction_strength(s_ab: f64, s_bc: f64, s_b: f64, s_c: f64) -> f64 {
    if s_b >= DEDUCTION_LIMIT {
        s_ab * s_bc
    } else {
        s_ab * s_bc + (1.0 - s_ab) * (s_c - s_b * s_bc) / (1.0 - s_b)
    }
}

/// Deduction: A→B, B→C ⊢ A→C
///
/// Forward chaining through implications. Without a truth value for the
/// conclusion term C, its strength is estimated by `sBC`.
pub fn deduction(ab: &TruthValue, bc: &TruthValue, b: &TruthValue) -> TruthValue {
    TruthValue::new(
        deduction_strength(ab.strength, bc.strength, b.strength, bc.strength),
        ab.confidence * bc.confidence * b.confidence,
    )
}

/// Deduction with a known truth value for the conclusion term C.
pub fn deduction_with_term(
    ab: &TruthValue,
    bc: &TruthValue,
    b: &TruthValue,
    c: &TruthValue,
) -> TruthValue {
    TruthValue::new(
        deduction_strength(ab.strength, bc.strength, b.strength, c.strength),
        ab.confidence * bc.confidence * b.confidence,
    )
}

/// Induction: A→B, A→C ⊢ B→C
///
/// Generalizing from a shared source. Strength is the deduction form with AB
/// read as BA; confidence is halved.
pub fn induction(ab: &TruthValue, ac: &TruthValue, a: &TruthValue) -> TruthValue {
    TruthValue::new(
        deduction_strength(ab.strength, ac.strength, a.strength, ac.strength),
        ab.confidence * ac.confidence * a.confidence * INDUCTION_DISCOUNT,
    )
}

/// Abduction: A→C, B→C ⊢ A→B
///
/// Inferring a relation from a shared effect. Strength is the deduction form
/// through C with BC read as CB.
pub fn abduction(ac: &TruthValue, bc: &TruthValue, c: &TruthValue) -> TruthValue {
    TruthValue::new(
        deduction_strength(ac.strength, bc.strength, c.strength, bc.strength),
        ac.confidence * bc.confidence * c.confidence * ABDUCTION_DISCOUNT,
    )
}

/// Revision: merge two truth values backed by independent evidence.
///
/// Strength is the evidence-weighted mean `(s1·n1 + s2·n2)/(n1 + n2)`,
/// computed as `s1 + (s2 − s1)·n2/(n1 + n2)` so equal strengths come back
/// bit-identical. Infinite evidence (confidence 1) dominates finite evidence.
pub fn revision(tv1: &TruthValue, tv2: &TruthValue) -> TruthValue {
    let n1 = tv1.count();
    let n2 = tv2.count();

    match (n1.is_infinite(), n2.is_infinite()) {
        (true, true) => {
            return TruthValue::new(mean(tv1.strength, tv2.strength), 1.0);
        }
        (true, false) => return TruthValue::new(tv1.strength, 1.0),
        (false, true) => return TruthValue::new(tv2.strength, 1.0),
        (false, false) => {}
    }

    let total = n1 + n2;
    if total <= 0.0 {
        return TruthValue::new(mean(tv1.strength, tv2.strength), 0.0);
    }

    let strength = tv1.strength + (tv2.strength - tv1.strength) * (n2 / total);
    TruthValue::from_count(strength, total)
}

fn mean(a: f64, b: f64) -> f64 {
    if a == b {
        a
    } else {
        (a + b) / 2.0
    }
}

/// Fold [`revision`] left to right. An empty list is `<0, 0>`.
///
/// The fold is an approximation: the weighted mean itself is order
/// independent, but confidence rounding at each step is not guaranteed to be.
pub fn combine(tvs: &[TruthValue]) -> TruthValue {
    let mut iter = tvs.iter();
    let Some(first) = iter.next() else {
        return TruthValue::null();
    };
    iter.fold(*first, |acc, tv| revision(&acc, tv))
}

/// Conjunction: A, B ⊢ A ∧ B (independence).
pub fn conjunction(a: &TruthValue, b: &TruthValue) -> TruthValue {
    TruthValue::new(a.strength * b.strength, a.confidence * b.confidence)
}

/// Conjunction over any number of members. Empty is `<0, 0>`.
pub fn conjunction_all(tvs: &[TruthValue]) -> TruthValue {
    let mut iter = tvs.iter();
    let Some(first) = iter.next() else {
        return TruthValue::null();
    };
    iter.fold(first.clamped(), |acc, tv| conjunction(&acc, tv))
}

/// Disjunction: A, B ⊢ A ∨ B
pub fn disjunction(a: &TruthValue, b: &TruthValue) -> TruthValue {
    TruthValue::new(
        a.strength + b.strength - a.strength * b.strength,
        a.confidence * b.confidence,
    )
}

/// Disjunction over any number of members. Empty is `<0, 0>`.
pub fn disjunction_all(tvs: &[TruthValue]) -> TruthValue {
    let mut iter = tvs.iter();
    let Some(first) = iter.next() else {
        return TruthValue::null();
    };
    iter.fold(first.clamped(), |acc, tv| disjunction(&acc, tv))
}

/// Negation: NOT operation. Confidence is preserved.
pub fn negation(a: &TruthValue) -> TruthValue {
    TruthValue::new(1.0 - a.strength, a.confidence)
}

/// Implication strength from term strengths: `min(1, sB/sA)`, vacuously 1
/// when `sA = 0`.
pub fn implication(a: &TruthValue, b: &TruthValue) -> TruthValue {
    let strength = if a.strength <= 0.0 {
        1.0
    } else {
        (b.strength / a.strength).min(1.0)
    };
    TruthValue::new(strength, a.confidence * b.confidence)
}

/// Modus ponens: A, A→B ⊢ B
pub fn modus_ponens(a: &TruthValue, ab: &TruthValue) -> TruthValue {
    TruthValue::new(a.strength * ab.strength, a.confidence * ab.confidence)
}

/// Modus tollens: ¬B, A→B ⊢ ¬A
pub fn modus_tollens(not_b: &TruthValue, ab: &TruthValue) -> TruthValue {
    let support = not_b.strength * ab.strength;
    let denom = support + (1.0 - ab.strength);
    let strength = if denom <= 0.0 { 0.0 } else { support / denom };
    TruthValue::new(
        strength,
        not_b.confidence * ab.confidence * MODUS_TOLLENS_DISCOUNT,
    )
}

/// Deduction along a chain `L1 (T1) L2 (T2) … Ln`: `links[i]` joins term
/// `terms[i-1]` to `terms[i]`. `terms` holds the n−1 middle terms; missing
/// terms stop the fold early. An empty chain is `<0, 0>`.
pub fn chain(links: &[TruthValue], terms: &[TruthValue]) -> TruthValue {
    let mut iter = links.iter();
    let Some(first) = iter.next() else {
        return TruthValue::null();
    };
    let mut acc = first.clamped();
    for (link, term) in iter.zip(terms.iter()) {
        acc = deduction(&acc, link, term);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv(s: f64, c: f64) -> TruthValue {
        TruthValue::new(s, c)
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_deduction_worked_example() {
        let ded = deduction(&tv(0.9, 0.8), &tv(0.8, 0.7), &tv(0.8, 0.8));
        assert!(approx_eq(ded.strength, 0.80), "got {}", ded.strength);
        assert!(approx_eq(ded.confidence, 0.8 * 0.7 * 0.8));
    }

    #[test]
    fn test_deduction_limit_is_exact_product() {
        let ab = tv(0.7, 0.6);
        let bc = tv(0.5, 0.9);
        let b = tv(0.99995, 0.4);
        let ded = deduction(&ab, &bc, &b);
        assert_eq!(ded.strength, 0.7 * 0.5);
        assert_eq!(ded.confidence, 0.6 * 0.9 * 0.4);
    }

    #[test]
    fn test_deduction_with_term_clamps() {
        // Large sC with a small denominator overshoots before clamping
        let ded = deduction_with_term(&tv(0.0, 1.0), &tv(0.0, 1.0), &tv(0.99, 1.0), &tv(1.0, 1.0));
        assert_eq!(ded.strength, 1.0);
    }

    #[test]
    fn test_induction_and_abduction_discounts() {
        let x = tv(0.8, 0.9);
        let y = tv(0.7, 0.8);
        let t = tv(0.5, 0.5);
        let ind = induction(&x, &y, &t);
        let abd = abduction(&x, &y, &t);
        assert!(approx_eq(ind.confidence, 0.9 * 0.8 * 0.5 * 0.5));
        assert!(approx_eq(abd.confidence, 0.9 * 0.8 * 0.5 * 0.3));
        assert!(abd.confidence < ind.confidence);
        // Same strength form, different reading
        assert!(approx_eq(ind.strength, abd.strength));
    }

    #[test]
    fn test_revision_with_itself() {
        let t = tv(0.37, 0.6);
        let r = revision(&t, &t);
        assert_eq!(r.strength, t.strength);
        assert!(r.confidence > t.confidence);

        let certain = tv(0.4, 1.0);
        let r = revision(&certain, &certain);
        assert_eq!(r.strength, 0.4);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn test_revision_weights_by_evidence() {
        // c = 0.5 → n = k; c = 0.8 → n = 4k
        let weak = tv(0.0, 0.5);
        let strong = tv(1.0, 0.8);
        let r = revision(&weak, &strong);
        assert!(approx_eq(r.strength, 0.8));
        assert!(approx_eq(r.confidence, 5.0 / 6.0));
    }

    #[test]
    fn test_revision_infinite_evidence_dominates() {
        let r = revision(&tv(0.2, 1.0), &tv(0.9, 0.99));
        assert_eq!(r.strength, 0.2);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn test_revision_zero_evidence() {
        let r = revision(&tv(0.2, 0.0), &tv(0.6, 0.0));
        assert!(approx_eq(r.strength, 0.4));
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn test_combine_empty_is_null() {
        assert_eq!(combine(&[]), TruthValue::null());
        let single = tv(0.3, 0.3);
        assert_eq!(combine(&[single]), single);
    }

    #[test]
    fn test_connectives() {
        let a = tv(0.8, 0.9);
        let b = tv(0.5, 0.5);
        let and = conjunction(&a, &b);
        let or = disjunction(&a, &b);
        let not = negation(&a);
        assert!(approx_eq(and.strength, 0.4));
        assert!(approx_eq(or.strength, 0.9));
        assert!(approx_eq(not.strength, 0.2));
        assert!(approx_eq(not.confidence, 0.9));
        assert!(approx_eq(conjunction_all(&[a, b, b]).strength, 0.2));
        assert_eq!(disjunction_all(&[]), TruthValue::null());
    }

    #[test]
    fn test_implication() {
        assert_eq!(implication(&tv(0.0, 0.5), &tv(0.3, 0.5)).strength, 1.0);
        assert!(approx_eq(implication(&tv(0.5, 0.5), &tv(0.25, 0.5)).strength, 0.5));
        assert_eq!(implication(&tv(0.2, 0.5), &tv(0.9, 0.5)).strength, 1.0);
    }

    #[test]
    fn test_modus_ponens_and_tollens() {
        let mp = modus_ponens(&tv(0.9, 0.9), &tv(0.8, 0.5));
        assert!(approx_eq(mp.strength, 0.72));
        assert!(approx_eq(mp.confidence, 0.45));

        let mt = modus_tollens(&tv(0.9, 0.9), &tv(0.8, 0.5));
        assert!(approx_eq(mt.strength, 0.72 / (0.72 + 0.2)));
        assert!(approx_eq(mt.confidence, 0.9 * 0.5 * 0.8));

        // 0/0 degenerates to 0
        assert_eq!(modus_tollens(&tv(0.0, 1.0), &tv(1.0, 1.0)).strength, 0.0);
    }

    #[test]
    fn test_chain_matches_nested_deduction() {
        let l1 = tv(0.9, 0.9);
        let l2 = tv(0.8, 0.9);
        let l3 = tv(0.7, 0.9);
        let t1 = tv(0.6, 0.9);
        let t2 = tv(0.5, 0.9);
        let expected = deduction(&deduction(&l1, &l2, &t1), &l3, &t2);
        assert_eq!(chain(&[l1, l2, l3], &[t1, t2]), expected);
        assert_eq!(chain(&[], &[]), TruthValue::null());
    }
}
