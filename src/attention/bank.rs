//! The attention ledger.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::EcanConfig;
use crate::atomspace::{format_number, Atom, AtomSpace, RemovedAtom};
use crate::{AtomId, AttentionValue, TruthValue};

/// What one [`AttentionBank::run_cycle`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EcanCycleReport {
    /// Sti moved between atoms by spreading.
    pub spread: f64,
    /// Sti returned to the pool as rent.
    pub rent: f64,
    /// Ids removed by forgetting, in removal order.
    pub forgotten: Vec<AtomId>,
    /// Residual sti returned by forgotten atoms.
    pub reclaimed_sti: f64,
    /// Residual lti returned by forgotten atoms.
    pub reclaimed_lti: f64,
}

/// Conserved sti/lti ledger over one [`AtomSpace`].
#[derive(Clone, Debug)]
pub struct AttentionBank {
    config: EcanConfig,
    total_sti: f64,
    available_sti: f64,
    total_lti: f64,
    available_lti: f64,
}

impl AttentionBank {
    /// A bank with all funds available. Pair it with a space whose atoms
    /// hold no attention yet.
    pub fn new(config: EcanConfig) -> Self {
        Self {
            total_sti: config.total_sti,
            available_sti: config.total_sti,
            total_lti: config.total_lti,
            available_lti: config.total_lti,
            config,
        }
    }

    /// A bank for a space that already holds attention (e.g. restored from
    /// persistence). Funds already on atoms are taken out of the pool; if they
    /// exceed the configured supply the supply is raised to match. Negative
    /// balances are zeroed first so the pool never exceeds the supply.
    pub fn for_space(config: EcanConfig, space: &mut AtomSpace) -> Self {
        let overdrawn: Vec<(AtomId, AttentionValue)> = space
            .iter()
            .map(|a| (a.id(), a.attention_value()))
            .filter(|(_, av)| av.sti < 0.0 || av.lti < 0.0)
            .collect();
        for (id, av) in overdrawn {
            debug!(atom = id.raw(), sti = av.sti, lti = av.lti, "zeroing negative balance");
            space.set_attention_value(
                id,
                AttentionValue {
                    sti: av.sti.max(0.0),
                    lti: av.lti.max(0.0),
                    vlti: av.vlti,
                },
            );
        }

        let (sti, lti) = circulating(space);
        let total_sti = config.total_sti.max(sti);
        let total_lti = config.total_lti.max(lti);
        Self {
            total_sti,
            available_sti: total_sti - sti,
            total_lti,
            available_lti: total_lti - lti,
            config,
        }
    }

    pub fn config(&self) -> &EcanConfig {
        &self.config
    }

    pub fn total_sti(&self) -> f64 {
        self.total_sti
    }

    pub fn available_sti(&self) -> f64 {
        self.available_sti
    }

    pub fn total_lti(&self) -> f64 {
        self.total_lti
    }

    pub fn available_lti(&self) -> f64 {
        self.available_lti
    }

    pub fn minimum_sti(&self) -> f64 {
        self.config.minimum_sti
    }

    pub fn minimum_lti(&self) -> f64 {
        self.config.minimum_lti
    }

    // =========================================================================
    // STIMULUS
    // =========================================================================

    /// Pay up to `amount` sti from the pool to `atom`, plus an lti wage.
    ///
    /// Returns the sti actually granted: clamped to the available pool, 0 for
    /// unknown atoms and for negative or NaN amounts.
    pub fn stimulate(&mut self, space: &mut AtomSpace, atom: AtomId, amount: f64) -> f64 {
        let Some(mut av) = space.attention_value(atom) else {
            return 0.0;
        };
        if !(amount > 0.0) {
            return 0.0;
        }
        let granted = amount.min(self.available_sti);
        if !(granted > 0.0) {
            return 0.0;
        }
        av.sti += granted;
        self.available_sti -= granted;

        let wage = (granted * self.config.lti_wage).min(self.available_lti);
        if wage > 0.0 {
            av.lti += wage;
            self.available_lti -= wage;
        }

        space.set_attention_value(atom, av);
        trace!(atom = atom.raw(), granted, wage, "stimulate");
        granted
    }

    /// Pay up to `amount` lti from the pool to `atom`. Same clamping as
    /// [`stimulate`](Self::stimulate).
    pub fn stimulate_lti(&mut self, space: &mut AtomSpace, atom: AtomId, amount: f64) -> f64 {
        let Some(mut av) = space.attention_value(atom) else {
            return 0.0;
        };
        if !(amount > 0.0) {
            return 0.0;
        }
        let granted = amount.min(self.available_lti);
        if !(granted > 0.0) {
            return 0.0;
        }
        av.lti += granted;
        self.available_lti -= granted;
        space.set_attention_value(atom, av);
        granted
    }

    /// Conserved attention write.
    ///
    /// Targets are floored at 0 so a decrease never refunds more than the
    /// atom holds. Increases are drawn from the pools and clamp to available
    /// funds; decreases return to the pools. `vlti` is written as given (NaN
    /// reads as 0). Returns the value actually stored, `None` for unknown
    /// atoms.
    pub fn set_attention_value(
        &mut self,
        space: &mut AtomSpace,
        atom: AtomId,
        av: AttentionValue,
    ) -> Option<AttentionValue> {
        let current = space.attention_value(atom)?;
        let d_sti = bounded_delta(current.sti, av.sti, self.available_sti);
        let d_lti = bounded_delta(current.lti, av.lti, self.available_lti);

        let stored = AttentionValue {
            sti: current.sti + d_sti,
            lti: current.lti + d_lti,
            vlti: if av.vlti.is_nan() { 0.0 } else { av.vlti },
        };
        self.available_sti -= d_sti;
        self.available_lti -= d_lti;
        space.set_attention_value(atom, stored);
        Some(stored)
    }

    // =========================================================================
    // SPREADING
    // =========================================================================

    /// Spread `factor · sti` from every atom above the spread threshold to its
    /// neighbours, weighted by the connecting link's `strength × confidence`.
    ///
    /// All senders read one snapshot of sti values, so the result does not
    /// depend on iteration order. Atoms with no weighted neighbour keep their
    /// sti. Returns the total sti moved.
    pub fn spread_activation(&mut self, space: &mut AtomSpace, factor: f64) -> f64 {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if factor == 0.0 {
            return 0.0;
        }

        let threshold = self.config.spread_threshold;
        let senders: Vec<(AtomId, f64)> = space
            .iter()
            .map(|a| (a.id(), a.attention_value().sti))
            .filter(|(_, sti)| *sti > threshold)
            .collect();

        let mut deltas: BTreeMap<AtomId, f64> = BTreeMap::new();
        let mut moved = 0.0;

        for (id, sti) in senders {
            let targets = neighbours(space, id);
            let total_weight: f64 = targets.iter().map(|(_, w)| w).sum();
            if !(total_weight > 0.0) {
                continue;
            }

            let amount = factor * sti;
            *deltas.entry(id).or_default() -= amount;
            moved += amount;

            // The last share takes the remainder so each sender balances.
            let mut remaining = amount;
            let last = targets.len() - 1;
            for (i, (target, weight)) in targets.into_iter().enumerate() {
                let share = if i == last {
                    remaining
                } else {
                    amount * weight / total_weight
                };
                remaining -= share;
                *deltas.entry(target).or_default() += share;
            }
        }

        for (id, delta) in deltas {
            if let Some(mut av) = space.attention_value(id) {
                av.sti += delta;
                space.set_attention_value(id, av);
            }
        }

        debug!(moved, factor, "spread_activation");
        moved
    }

    // =========================================================================
    // RENT
    // =========================================================================

    /// Every atom pays `min(rate · lti, max(sti, 0))` sti back to the pool.
    /// Returns the total collected.
    pub fn collect_rent(&mut self, space: &mut AtomSpace, rate: f64) -> f64 {
        if !(rate > 0.0) {
            return 0.0;
        }

        let charges: Vec<(AtomId, AttentionValue, f64)> = space
            .iter()
            .filter_map(|a| {
                let av = a.attention_value();
                let rent = (rate * av.lti).min(av.sti.max(0.0));
                (rent > 0.0).then_some((a.id(), av, rent))
            })
            .collect();

        let mut collected = 0.0;
        for (id, mut av, rent) in charges {
            av.sti -= rent;
            space.set_attention_value(id, av);
            self.available_sti += rent;
            collected += rent;
        }

        debug!(collected, rate, "collect_rent");
        collected
    }

    // =========================================================================
    // FORGETTING
    // =========================================================================

    fn is_forgettable(&self, atom: &Atom) -> bool {
        let av = atom.attention_value();
        av.sti < self.config.minimum_sti && av.lti < self.config.minimum_lti && !av.is_pinned()
    }

    /// Links at or above the guard confidence are kept whatever their
    /// attention.
    fn is_guarded(&self, atom: &Atom) -> bool {
        atom.is_link() && atom.truth_value().confidence >= self.config.forget_guard_confidence
    }

    /// Remove low-importance atoms and return their residual funds.
    ///
    /// An atom is forgotten together with every link that (transitively)
    /// contains it, and only if each atom in that closure is itself
    /// forgettable and no link in it, the atom included, reaches
    /// `forget_guard_confidence`. Candidates are taken in ascending id order;
    /// a removal that would exceed `max_forget_per_cycle` is skipped.
    pub fn forget(&mut self, space: &mut AtomSpace) -> Vec<RemovedAtom> {
        let cap = self.config.max_forget_per_cycle;

        let candidates: Vec<AtomId> = space
            .iter()
            .filter(|a| self.is_forgettable(a) && !self.is_guarded(a))
            .map(|a| a.id())
            .collect();

        let mut removed: Vec<RemovedAtom> = Vec::new();
        for id in candidates {
            if removed.len() >= cap {
                break;
            }
            if !space.contains(id) {
                continue;
            }

            let closure = space.incoming_closure(id);
            if closure.len() > cap - removed.len() {
                continue;
            }
            let protected = closure.iter().filter(|c| **c != id).any(|c| {
                space
                    .get(*c)
                    .map(|link| !self.is_forgettable(link) || self.is_guarded(link))
                    .unwrap_or(false)
            });
            if protected {
                trace!(atom = id.raw(), "forget: protected by incoming link");
                continue;
            }

            if let Some(atoms) = space.remove(id, true) {
                self.reclaim(&atoms);
                removed.extend(atoms);
            }
        }

        if !removed.is_empty() {
            debug!(count = removed.len(), "forget");
        }
        removed
    }

    /// Return the residual funds of atoms removed outside [`forget`](Self::forget).
    pub fn reclaim(&mut self, removed: &[RemovedAtom]) {
        for atom in removed {
            let av = atom.attention_value();
            self.available_sti += av.sti;
            self.available_lti += av.lti;
        }
    }

    // =========================================================================
    // FOCUS / CYCLE
    // =========================================================================

    /// The `k` atoms with the highest sti, ties broken by ascending id.
    pub fn attentional_focus(&self, space: &AtomSpace, k: usize) -> Vec<AtomId> {
        let mut ranked: Vec<(AtomId, f64)> = space
            .iter()
            .map(|a| (a.id(), a.attention_value().sti))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked.into_iter().map(|(id, _)| id).collect()
    }

    /// One ECAN cycle: spread, then rent, then forget.
    pub fn run_cycle(&mut self, space: &mut AtomSpace) -> EcanCycleReport {
        let spread = self.spread_activation(space, self.config.spread_factor);
        let rent = self.collect_rent(space, self.config.rent_rate);
        let removed = self.forget(space);

        let mut report = EcanCycleReport {
            spread,
            rent,
            ..Default::default()
        };
        for atom in removed {
            let av = atom.attention_value();
            report.reclaimed_sti += av.sti;
            report.reclaimed_lti += av.lti;
            report.forgotten.push(atom.id());
        }
        report
    }

    // =========================================================================
    // AUDIT
    // =========================================================================

    /// Largest absolute deviation from `available + Σ atom = total` across
    /// both currencies.
    pub fn conservation_error(&self, space: &AtomSpace) -> f64 {
        let (sti, lti) = circulating(space);
        let sti_err = (self.available_sti + sti - self.total_sti).abs();
        let lti_err = (self.available_lti + lti - self.total_lti).abs();
        sti_err.max(lti_err)
    }

    pub fn is_conserved(&self, space: &AtomSpace, eps: f64) -> bool {
        self.conservation_error(space) <= eps
    }

    pub fn to_debug_text(&self) -> String {
        format!(
            "(bank (total-sti {}) (available-sti {}) (total-lti {}) (available-lti {}) (minimum-sti {}) (minimum-lti {}))",
            format_number(self.total_sti),
            format_number(self.available_sti),
            format_number(self.total_lti),
            format_number(self.available_lti),
            format_number(self.config.minimum_sti),
            format_number(self.config.minimum_lti),
        )
    }
}

/// Delta from `current` toward `target`, floored so the result stays
/// non-negative and capped by what the pool can pay.
fn bounded_delta(current: f64, target: f64, available: f64) -> f64 {
    let target = if target.is_finite() { target.max(0.0) } else { current };
    let delta = target - current;
    if delta > 0.0 {
        delta.min(available.max(0.0))
    } else {
        delta
    }
}

fn circulating(space: &AtomSpace) -> (f64, f64) {
    space.iter().fold((0.0, 0.0), |(sti, lti), a| {
        let av = a.attention_value();
        (sti + av.sti, lti + av.lti)
    })
}

fn link_weight(tv: TruthValue) -> f64 {
    tv.strength * tv.confidence
}

/// Weighted neighbours: a link's own members, plus the other members of
/// every link that contains the atom.
fn neighbours(space: &AtomSpace, id: AtomId) -> Vec<(AtomId, f64)> {
    let Some(atom) = space.get(id) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    if atom.is_link() {
        let w = link_weight(atom.truth_value());
        out.extend(atom.outgoing().iter().filter(|m| **m != id).map(|m| (*m, w)));
    }
    for link_id in atom.incoming() {
        if let Some(link) = space.get(link_id) {
            let w = link_weight(link.truth_value());
            out.extend(link.outgoing().iter().filter(|m| **m != id).map(|m| (*m, w)));
        }
    }
    out.retain(|(_, w)| *w > 0.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinkType, NodeType};

    fn pair(space: &mut AtomSpace, tv: TruthValue) -> (AtomId, AtomId, AtomId) {
        let a = space.add_node(NodeType::Concept, "a");
        let b = space.add_node(NodeType::Concept, "b");
        let ab = space
            .add_link_with_tv(LinkType::Inheritance, vec![a, b], tv)
            .unwrap();
        (a, b, ab)
    }

    #[test]
    fn test_stimulate_clamps_to_available() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let mut bank = AttentionBank::new(EcanConfig {
            total_sti: 40.0,
            ..Default::default()
        });

        assert_eq!(bank.stimulate(&mut space, a, 1000.0), 40.0);
        assert_eq!(space.attention_value(a).unwrap().sti, 40.0);
        assert_eq!(bank.available_sti(), 0.0);
        assert!(bank.is_conserved(&space, 1e-9));
    }

    #[test]
    fn test_stimulate_rejects_bad_input() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let mut bank = AttentionBank::new(EcanConfig::default());

        assert_eq!(bank.stimulate(&mut space, a, -5.0), 0.0);
        assert_eq!(bank.stimulate(&mut space, a, f64::NAN), 0.0);
        assert_eq!(bank.stimulate(&mut space, AtomId(99), 5.0), 0.0);
        assert_eq!(bank.available_sti(), 10_000.0);
    }

    #[test]
    fn test_stimulate_pays_lti_wage() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let mut bank = AttentionBank::new(EcanConfig::default());

        bank.stimulate(&mut space, a, 50.0);
        let av = space.attention_value(a).unwrap();
        assert!((av.lti - 5.0).abs() < 1e-12);
        assert!((bank.available_lti() - 9_995.0).abs() < 1e-9);
    }

    #[test]
    fn test_spread_moves_sti_to_neighbours() {
        let mut space = AtomSpace::new();
        let (a, b, _) = pair(&mut space, TruthValue::new(1.0, 1.0));
        let mut bank = AttentionBank::new(EcanConfig::default());
        bank.stimulate(&mut space, a, 100.0);

        let moved = bank.spread_activation(&mut space, 0.5);
        assert!((moved - 50.0).abs() < 1e-9);
        assert!((space.attention_value(a).unwrap().sti - 50.0).abs() < 1e-9);
        assert!((space.attention_value(b).unwrap().sti - 50.0).abs() < 1e-9);
        assert!(bank.is_conserved(&space, 1e-9));
    }

    #[test]
    fn test_spread_zero_weight_keeps_sti() {
        let mut space = AtomSpace::new();
        let (a, b, _) = pair(&mut space, TruthValue::new(1.0, 0.0));
        let mut bank = AttentionBank::new(EcanConfig::default());
        bank.stimulate(&mut space, a, 100.0);

        assert_eq!(bank.spread_activation(&mut space, 0.5), 0.0);
        assert_eq!(space.attention_value(a).unwrap().sti, 100.0);
        assert_eq!(space.attention_value(b).unwrap().sti, 0.0);
    }

    #[test]
    fn test_rent_is_bounded_by_sti() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let mut bank = AttentionBank::new(EcanConfig::default());
        bank.stimulate(&mut space, a, 10.0);
        bank.stimulate_lti(&mut space, a, 999.0);

        // rate·lti = 0.5 · 1000 ≫ sti = 10
        let collected = bank.collect_rent(&mut space, 0.5);
        assert!((collected - 10.0).abs() < 1e-9);
        assert_eq!(space.attention_value(a).unwrap().sti, 0.0);
        assert!(bank.is_conserved(&space, 1e-9));
    }

    #[test]
    fn test_forget_returns_funds() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let keep = space.add_node(NodeType::Concept, "keep");
        let mut bank = AttentionBank::new(EcanConfig::default());
        bank.stimulate(&mut space, a, 0.5);
        bank.stimulate(&mut space, keep, 100.0);

        let removed = bank.forget(&mut space);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id(), a);
        assert!(!space.contains(a));
        assert!(space.contains(keep));
        assert!(bank.is_conserved(&space, 1e-9));
    }

    #[test]
    fn test_forget_respects_guard_and_pins() {
        let mut space = AtomSpace::new();
        let (a, b, ab) = pair(&mut space, TruthValue::new(0.99, 0.99));
        let c = space.add_node(NodeType::Concept, "c");
        let mut bank = AttentionBank::new(EcanConfig::default());
        bank.set_attention_value(&mut space, c, AttentionValue::new(0.0, 0.0, 1.0));

        // Idle but confident: neither the link nor its members go, on any call.
        for _ in 0..3 {
            assert!(bank.forget(&mut space).is_empty());
        }
        assert!(space.contains(ab) && space.contains(a) && space.contains(b));
        assert!(space.contains(c));
    }

    #[test]
    fn test_forget_takes_weak_link_with_members() {
        let mut space = AtomSpace::new();
        let (a, b, ab) = pair(&mut space, TruthValue::new(0.5, 0.3));
        let mut bank = AttentionBank::new(EcanConfig::default());

        let removed: Vec<AtomId> = bank.forget(&mut space).iter().map(|r| r.id()).collect();
        assert_eq!(removed, vec![ab, a, b]);
        assert!(space.is_empty());
        assert!(bank.is_conserved(&space, 1e-9));
    }

    #[test]
    fn test_forget_cap() {
        let mut space = AtomSpace::new();
        for i in 0..5 {
            space.add_node(NodeType::Concept, format!("n{i}"));
        }
        let mut bank = AttentionBank::new(EcanConfig {
            max_forget_per_cycle: 2,
            ..Default::default()
        });
        assert_eq!(bank.forget(&mut space).len(), 2);
        assert_eq!(space.len(), 3);
    }

    #[test]
    fn test_focus_ties_by_id() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let b = space.add_node(NodeType::Concept, "b");
        let c = space.add_node(NodeType::Concept, "c");
        let mut bank = AttentionBank::new(EcanConfig::default());
        bank.stimulate(&mut space, c, 5.0);
        bank.stimulate(&mut space, b, 5.0);
        bank.stimulate(&mut space, a, 1.0);

        assert_eq!(bank.attentional_focus(&space, 2), vec![b, c]);
        assert_eq!(bank.attentional_focus(&space, 10), vec![b, c, a]);
    }

    #[test]
    fn test_set_attention_value_is_conserved() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let mut bank = AttentionBank::new(EcanConfig {
            total_sti: 100.0,
            ..Default::default()
        });

        let stored = bank
            .set_attention_value(&mut space, a, AttentionValue::new(500.0, 20.0, 0.0))
            .unwrap();
        assert_eq!(stored.sti, 100.0);
        assert_eq!(stored.lti, 20.0);
        bank.set_attention_value(&mut space, a, AttentionValue::new(30.0, 0.0, 0.0));
        assert_eq!(bank.available_sti(), 70.0);
        assert!(bank.is_conserved(&space, 1e-9));
    }

    #[test]
    fn test_negative_write_refunds_only_holdings() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let mut bank = AttentionBank::new(EcanConfig::default());

        let stored = bank
            .set_attention_value(&mut space, a, AttentionValue::new(-500.0, -3.0, 0.0))
            .unwrap();
        assert_eq!(stored.sti, 0.0);
        assert_eq!(stored.lti, 0.0);
        assert_eq!(bank.available_sti(), bank.total_sti());

        bank.stimulate(&mut space, a, 20.0);
        bank.set_attention_value(&mut space, a, AttentionValue::new(-500.0, 0.0, 0.0));
        assert_eq!(space.attention_value(a).unwrap().sti, 0.0);
        assert!(bank.available_sti() <= bank.total_sti());
        assert!(bank.is_conserved(&space, 1e-9));
    }

    #[test]
    fn test_for_space_accounts_circulation() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        space.set_attention_value(a, AttentionValue::new(25.0, 5.0, 0.0));

        let bank = AttentionBank::for_space(EcanConfig::default(), &mut space);
        assert_eq!(bank.available_sti(), 9_975.0);
        assert!(bank.is_conserved(&space, 1e-9));
    }

    #[test]
    fn test_for_space_zeroes_negative_balances() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "a");
        let b = space.add_node(NodeType::Concept, "b");
        space.set_attention_value(a, AttentionValue::new(-300.0, -2.0, 0.0));
        space.set_attention_value(b, AttentionValue::new(40.0, 0.0, 0.0));

        let bank = AttentionBank::for_space(EcanConfig::default(), &mut space);
        assert_eq!(space.attention_value(a).unwrap().sti, 0.0);
        assert_eq!(bank.available_sti(), 9_960.0);
        assert!(bank.available_sti() <= bank.total_sti());
        assert!(bank.available_lti() <= bank.total_lti());
        assert!(bank.is_conserved(&space, 1e-9));
    }

    #[test]
    fn test_bank_debug_text() {
        let bank = AttentionBank::new(EcanConfig::default());
        assert_eq!(
            bank.to_debug_text(),
            "(bank (total-sti 10000) (available-sti 10000) (total-lti 10000) (available-lti 10000) (minimum-sti 1) (minimum-lti 1))"
        );
    }
}
