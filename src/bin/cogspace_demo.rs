//! cogspace demo: build a small taxonomy, allocate attention, reason, and
//! print the resulting snapshot.
//!
//! Usage: `RUST_LOG=debug cargo run --bin cogspace_demo`
//!
//! Configuration comes from `COGSPACE_*` environment variables (see
//! `CogConfig::overlay`).

use cogspace::{
    CogConfig, CogEngine, LinkType, MemoryStore, NodeType, Result, TruthValue, VERSION,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = CogConfig::from_env();
    config.validate()?;

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              cogspace v{:<39}║", VERSION);
    println!("╠═══════════════════════════════════════════════════════════════╣");
    println!("║  Total STI:   {:>45}  ║", config.ecan.total_sti);
    println!("║  Cache size:  {:>45}  ║", config.cache.max_size);
    println!("║  Max steps:   {:>45}  ║", config.reasoner.max_steps);
    println!("║  Focus:       {:>45}  ║", format!("{:?}", config.reasoner.focus_size));
    println!("╚═══════════════════════════════════════════════════════════════╝");

    let mut engine = CogEngine::with_store(config.clone(), MemoryStore::new());

    // =========================================================================
    // KNOWLEDGE
    // =========================================================================

    let space = engine.space_mut();
    let cat = space.add_node_with_tv(NodeType::Concept, "cat", TruthValue::new(0.1, 0.9));
    let mammal = space.add_node_with_tv(NodeType::Concept, "mammal", TruthValue::new(0.2, 0.9));
    let animal = space.add_node_with_tv(NodeType::Concept, "animal", TruthValue::new(0.4, 0.9));
    let furry = space.add_node_with_tv(NodeType::Predicate, "furry", TruthValue::new(0.3, 0.8));

    space.add_link_with_tv(LinkType::Implication, vec![cat, mammal], TruthValue::new(0.95, 0.9))?;
    space.add_link_with_tv(LinkType::Implication, vec![mammal, animal], TruthValue::new(0.98, 0.9))?;
    let cat_furry =
        space.add_link_with_tv(LinkType::Implication, vec![cat, furry], TruthValue::new(0.9, 0.8))?;
    let mammal_and_furry = space.add_link(LinkType::And, vec![mammal, furry])?;
    let cat_animal = space.add_link(LinkType::Implication, vec![cat, animal])?;

    // =========================================================================
    // ATTENTION
    // =========================================================================

    engine.stimulate(cat, 200.0);
    engine.stimulate(mammal, 50.0);
    // Links below the guard confidence survive forgetting only on attention.
    for link in [cat_furry, mammal_and_furry, cat_animal] {
        engine.stimulate(link, 5.0);
    }
    let report = engine.run_ecan_cycle()?;
    println!(
        "ecan: spread {:.2}, rent {:.2}, forgotten {}",
        report.spread,
        report.rent,
        report.forgotten.len()
    );
    println!("focus: {:?}", engine.attentional_focus(5));

    // =========================================================================
    // REASONING
    // =========================================================================

    let outcome = engine.run_pass()?;
    println!(
        "forward: {} steps, {} results, {} written, {:?}",
        outcome.steps,
        outcome.results.len(),
        outcome.committed.len(),
        outcome.termination
    );

    if let Some(proof) = engine.backward_chain(cat_animal)? {
        println!(
            "backward: {} ⊢ {:?} via {} (committed: {})",
            engine.space().label(proof.target),
            proof.truth_value,
            proof.rule,
            proof.committed
        );
    }

    let again = engine.run_pass()?;
    println!(
        "second pass: {:?}, hit rate {:.2}",
        again.termination,
        engine.cache().hit_rate()
    );

    println!();
    print!("{}", engine.to_debug_text());
    if let Some(store) = engine.store() {
        println!("batches written: {}", store.batches_written());
    }
    Ok(())
}
