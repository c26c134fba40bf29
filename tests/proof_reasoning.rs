//! Reasoning Proofs: chaining over the engine end to end.
//!
//! These tests drive `CogEngine` the way a scheduler would (host edits, then
//! discrete units) and check what a reader of the AtomSpace or of the
//! persisted store can observe: derived conclusions, fixed points, cache
//! reuse and recovery after a restart.
//!
//! Run: `cargo test --test proof_reasoning`

use cogspace::{
    AtomId, CogConfig, CogEngine, LinkType, MemoryStore, NodeType, ReasonerConfig, RuleKind,
    Termination, TruthValue,
};

struct Syllogism {
    engine: CogEngine,
    a: AtomId,
    b: AtomId,
    c: AtomId,
    ab: AtomId,
    bc: AtomId,
}

fn config() -> CogConfig {
    CogConfig {
        reasoner: ReasonerConfig {
            rules: vec![RuleKind::Deduction, RuleKind::ModusPonens],
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A = <0.9, 0.9>, B = <0.8, 0.8>, C = <0.5, 0.9>
/// A→B = <0.9, 0.8>, B→C = <0.8, 0.7>
fn syllogism() -> Syllogism {
    let mut engine = CogEngine::with_store(config(), MemoryStore::new());
    let space = engine.space_mut();
    let a = space.add_node_with_tv(NodeType::Concept, "A", TruthValue::new(0.9, 0.9));
    let b = space.add_node_with_tv(NodeType::Concept, "B", TruthValue::new(0.8, 0.8));
    let c = space.add_node_with_tv(NodeType::Concept, "C", TruthValue::new(0.5, 0.9));
    let ab = space
        .add_link_with_tv(LinkType::Implication, vec![a, b], TruthValue::new(0.9, 0.8))
        .unwrap();
    let bc = space
        .add_link_with_tv(LinkType::Implication, vec![b, c], TruthValue::new(0.8, 0.7))
        .unwrap();
    Syllogism {
        engine,
        a,
        b,
        c,
        ab,
        bc,
    }
}

// =============================================================================
// RS-1: Forward chaining
// =============================================================================

/// PROOF RS-1: A→B, B→C ⊢ A→C
///
/// The conclusion link is created with the deduction truth value
/// <0.80, 0.448> and the run ends at a fixed point.
#[test]
fn reasoning_rs1_deduction_creates_conclusion() {
    let mut kb = syllogism();
    let outcome = kb.engine.run_pass().unwrap();

    let ac = kb
        .engine
        .space()
        .find_link(LinkType::Implication, &[kb.a, kb.c])
        .expect("A→C derived");
    let tv = kb.engine.space().truth_value(ac).unwrap();
    assert!((tv.strength - 0.80).abs() < 1e-6, "{tv:?}");
    assert!((tv.confidence - 0.448).abs() < 1e-9, "{tv:?}");

    assert_eq!(outcome.created, vec![ac]);
    assert_eq!(outcome.termination, Termination::FixedPoint);
    assert!(outcome
        .results
        .iter()
        .any(|r| r.rule == RuleKind::Deduction && r.premises_used == vec![kb.ab, kb.bc, kb.b]));
}

/// PROOF RS-1b: a second pass is a fixed point served from the cache
///
/// Nothing is committed, no batch is written, and premises the first pass
/// already evaluated are served from the cache.
#[test]
fn reasoning_rs1b_rerun_is_cached_fixed_point() {
    let mut kb = syllogism();
    kb.engine.run_pass().unwrap();
    let text = kb.engine.space().to_debug_text();
    let batches = kb.engine.store().unwrap().batches_written();
    let stats = kb.engine.cache().stats();

    let again = kb.engine.run_pass().unwrap();
    assert_eq!(again.termination, Termination::FixedPoint);
    assert_eq!(again.steps, 1);
    assert!(again.committed.is_empty());
    assert_eq!(kb.engine.space().to_debug_text(), text);
    assert_eq!(kb.engine.store().unwrap().batches_written(), batches);

    assert!(kb.engine.cache().stats().hits > stats.hits);
}

/// PROOF RS-1c: editing a premise invalidates and re-derives
///
/// Raising cBC to 0.9 makes the next pass recompute A→C with confidence
/// 0.8 · 0.9 · 0.8 instead of serving the stale cached value.
#[test]
fn reasoning_rs1c_premise_edit_rederives() {
    let mut kb = syllogism();
    kb.engine.run_pass().unwrap();

    kb.engine
        .space_mut()
        .set_truth_value(kb.bc, TruthValue::new(0.8, 0.9));
    let outcome = kb.engine.run_pass().unwrap();

    let ac = kb
        .engine
        .space()
        .find_link(LinkType::Implication, &[kb.a, kb.c])
        .unwrap();
    let tv = kb.engine.space().truth_value(ac).unwrap();
    assert!((tv.confidence - 0.8 * 0.9 * 0.8).abs() < 1e-9, "{tv:?}");
    assert!(outcome.committed.contains(&ac));
}

// =============================================================================
// RS-2: Backward chaining
// =============================================================================

/// PROOF RS-2: an unasserted goal link is proven through the chain and
/// written back
#[test]
fn reasoning_rs2_backward_proof_commits() {
    let mut kb = syllogism();
    let ac = kb
        .engine
        .space_mut()
        .add_link(LinkType::Implication, vec![kb.a, kb.c])
        .unwrap();

    let proof = kb.engine.backward_chain(ac).unwrap().expect("provable");
    assert_eq!(proof.target, ac);
    assert_eq!(proof.rule, RuleKind::Chain);
    assert_eq!(proof.premises, vec![kb.ab, kb.b, kb.bc]);
    assert!(proof.committed);

    let stored = kb.engine.space().truth_value(ac).unwrap();
    assert_eq!(stored, proof.truth_value);
    assert!((stored.strength - 0.80).abs() < 1e-6);
}

/// PROOF RS-2b: a goal with no supporting evidence yields no proof
#[test]
fn reasoning_rs2b_unsupported_goal() {
    let mut kb = syllogism();
    let ca = kb
        .engine
        .space_mut()
        .add_link(LinkType::Implication, vec![kb.c, kb.a])
        .unwrap();
    assert!(kb.engine.backward_chain(ca).unwrap().is_none());
    assert_eq!(
        kb.engine.space().truth_value(ca).unwrap(),
        TruthValue::default_tv()
    );
}

// =============================================================================
// RS-3: Persistence
// =============================================================================

/// PROOF RS-3: a restarted engine sees exactly what was derived
///
/// Method: reason, drop the engine, reopen from the same store. The restored
/// AtomSpace renders identically, and reasoning on it resumes at a fixed
/// point without creating duplicates.
#[test]
fn reasoning_rs3_restart_recovers_state() {
    let mut kb = syllogism();
    kb.engine.stimulate(kb.a, 25.0);
    kb.engine.run_pass().unwrap();
    let text = kb.engine.space().to_debug_text();
    let len = kb.engine.space().len();
    let store = kb.engine.into_store().unwrap();

    let mut reopened = CogEngine::open(config(), store).unwrap();
    assert_eq!(reopened.space().to_debug_text(), text);
    assert!(reopened.bank().is_conserved(reopened.space(), 1e-6));

    let outcome = reopened.run_pass().unwrap();
    assert_eq!(outcome.termination, Termination::FixedPoint);
    assert!(outcome.created.is_empty());
    assert_eq!(reopened.space().len(), len);

    let fresh = reopened.space_mut().add_node(NodeType::Concept, "D");
    assert!(fresh.raw() >= len as u64);
}

// =============================================================================
// RS-4: Attention-guided reasoning
// =============================================================================

/// PROOF RS-4: ECAN cycles, then a focus-guided pass, derive from what is in
/// focus
///
/// Method: two chains of confident implications, A→B→C and D→E→F. Only A is
/// stimulated. After ECAN cycles every confident link is still present, the
/// focus holds A and B, and a pass with `focus_size: Some(2)` derives A→C but
/// not D→F.
#[test]
fn reasoning_rs4_ecan_then_guided_pass() {
    let guided = CogConfig {
        reasoner: ReasonerConfig {
            focus_size: Some(2),
            ..config().reasoner
        },
        ..config()
    };
    let mut engine = CogEngine::with_store(guided, MemoryStore::new());
    let space = engine.space_mut();
    let names = ["A", "B", "C", "D", "E", "F"];
    let ids: Vec<AtomId> = names
        .iter()
        .map(|n| space.add_node_with_tv(NodeType::Concept, *n, TruthValue::new(0.8, 0.5)))
        .collect();
    let mut links = Vec::new();
    for (from, to) in [(0, 1), (1, 2), (3, 4), (4, 5)] {
        links.push(
            space
                .add_link_with_tv(
                    LinkType::Implication,
                    vec![ids[from], ids[to]],
                    TruthValue::new(0.9, 0.95),
                )
                .unwrap(),
        );
    }
    engine.stimulate(ids[0], 100.0);

    let report = engine.run_ecan_cycle().unwrap();
    assert!(report.forgotten.is_empty(), "{report:?}");
    for link in &links {
        assert!(engine.space().contains(*link));
    }
    assert_eq!(engine.attentional_focus(2), vec![ids[0], ids[1]]);

    let outcome = engine.run_pass().unwrap();
    let space = engine.space();
    let ac = space
        .find_link(LinkType::Implication, &[ids[0], ids[2]])
        .expect("A→C derived from focus");
    assert!(outcome.created.contains(&ac));
    assert!(space.find_link(LinkType::Implication, &[ids[3], ids[5]]).is_none());
    assert!(engine.bank().is_conserved(engine.space(), 1e-6));
}
