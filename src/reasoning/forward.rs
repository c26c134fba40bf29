//! Forward chaining.

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use tracing::{debug, info, trace};

use super::{ChainOutcome, Conclusion, InferenceResult, Phase, ReasonerConfig, Termination};
use crate::attention::AttentionBank;
use crate::cache::{CacheKey, CachedInference, InferenceCache};
use crate::pln::{self, apply_rule, RuleKind};
use crate::{AtomId, AtomSpace, LinkType, TruthValue};

/// Premise-driven chaining: select → apply → commit until nothing changes.
pub struct ForwardChainer {
    config: ReasonerConfig,
    phase: Phase,
}

impl ForwardChainer {
    pub fn new(config: ReasonerConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
        }
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        trace!(from = ?self.phase, to = ?phase, "forward chainer phase");
        self.phase = phase;
    }

    /// Run steps until a fixed point, `max_steps`, or `time_limit`.
    pub fn run(
        &mut self,
        space: &mut AtomSpace,
        bank: &mut AttentionBank,
        cache: &mut InferenceCache,
    ) -> ChainOutcome {
        let started = Instant::now();
        let mut outcome = ChainOutcome {
            steps: 0,
            results: Vec::new(),
            committed: Vec::new(),
            created: Vec::new(),
            termination: Termination::StepsExhausted,
        };

        while outcome.steps < self.config.max_steps {
            if let Some(limit) = self.config.time_limit {
                if started.elapsed() >= limit {
                    outcome.termination = Termination::TimeLimit;
                    break;
                }
            }

            self.enter(Phase::Selecting);
            let premises = self.select(space, bank);

            self.enter(Phase::Applying);
            let results = self.apply(space, cache, &premises);

            self.enter(Phase::Committing);
            let (committed, created) = self.commit(space, bank, cache, &results);

            outcome.steps += 1;
            debug!(
                step = outcome.steps,
                premises = premises.len(),
                results = results.len(),
                committed = committed.len(),
                created = created.len(),
                "forward step"
            );

            let fixed_point = committed.is_empty();
            outcome.results.extend(results);
            outcome.committed.extend(committed);
            outcome.created.extend(created);
            if fixed_point {
                outcome.termination = Termination::FixedPoint;
                break;
            }
        }

        self.enter(Phase::Idle);
        info!(
            steps = outcome.steps,
            results = outcome.results.len(),
            committed = outcome.committed.len(),
            termination = ?outcome.termination,
            "forward chaining finished"
        );
        outcome
    }

    // =========================================================================
    // SELECTING
    // =========================================================================

    /// Candidate premise links in ascending id order: implications plus
    /// `And`/`Or`/`Not` links. With a focus size, only links in the focus or
    /// with a member in it.
    pub fn select(&self, space: &AtomSpace, bank: &AttentionBank) -> Vec<AtomId> {
        let mut links: Vec<AtomId> = [LinkType::Implication, LinkType::And, LinkType::Or, LinkType::Not]
            .into_iter()
            .flat_map(|t| space.find_by_type(t))
            .collect();
        links.sort_unstable();

        if let Some(k) = self.config.focus_size {
            let focus: BTreeSet<AtomId> = bank.attentional_focus(space, k).into_iter().collect();
            links.retain(|l| focus.contains(l) || space.outgoing(*l).iter().any(|m| focus.contains(m)));
        }
        links
    }

    // =========================================================================
    // APPLYING
    // =========================================================================

    /// Apply every configured rule to every premise link, through the cache.
    pub fn apply(
        &self,
        space: &AtomSpace,
        cache: &mut InferenceCache,
        premises: &[AtomId],
    ) -> Vec<InferenceResult> {
        let mut out = Vec::new();
        for &link in premises {
            let Some(link_type) = space.get(link).and_then(|a| a.link_type()) else {
                continue;
            };
            for &rule in &self.config.rules {
                match (rule, link_type) {
                    (RuleKind::Deduction, LinkType::Implication) => {
                        self.deduce(space, cache, link, &mut out)
                    }
                    (RuleKind::Induction, LinkType::Implication) => {
                        self.induce(space, cache, link, &mut out)
                    }
                    (RuleKind::Abduction, LinkType::Implication) => {
                        self.abduce(space, cache, link, &mut out)
                    }
                    (RuleKind::ModusPonens, LinkType::Implication) => {
                        self.detach(space, cache, link, &mut out)
                    }
                    (RuleKind::Conjunction, LinkType::And)
                    | (RuleKind::Disjunction, LinkType::Or)
                    | (RuleKind::Negation, LinkType::Not) => {
                        let members = space.outgoing(link).to_vec();
                        self.infer(space, cache, rule, members, Conclusion::Atom(link), &mut out);
                    }
                    _ => {}
                }
            }
        }
        out
    }

    /// A→B, B→C ⊢ A→C
    fn deduce(
        &self,
        space: &AtomSpace,
        cache: &mut InferenceCache,
        ab: AtomId,
        out: &mut Vec<InferenceResult>,
    ) {
        let Some((a, b)) = implication(space, ab) else {
            return;
        };
        for (bc, c) in implications_from(space, b) {
            if c == a || bc == ab {
                continue;
            }
            let conclusion = Conclusion::Link {
                link_type: LinkType::Implication,
                outgoing: vec![a, c],
            };
            self.infer(space, cache, RuleKind::Deduction, vec![ab, bc, b], conclusion, out);
        }
    }

    /// A→B, A→C ⊢ B→C
    fn induce(
        &self,
        space: &AtomSpace,
        cache: &mut InferenceCache,
        ab: AtomId,
        out: &mut Vec<InferenceResult>,
    ) {
        let Some((a, b)) = implication(space, ab) else {
            return;
        };
        for (ac, c) in implications_from(space, a) {
            if c == b || ac == ab {
                continue;
            }
            let conclusion = Conclusion::Link {
                link_type: LinkType::Implication,
                outgoing: vec![b, c],
            };
            self.infer(space, cache, RuleKind::Induction, vec![ab, ac, a], conclusion, out);
        }
    }

    /// A→B, C→B ⊢ A→C
    fn abduce(
        &self,
        space: &AtomSpace,
        cache: &mut InferenceCache,
        ab: AtomId,
        out: &mut Vec<InferenceResult>,
    ) {
        let Some((a, b)) = implication(space, ab) else {
            return;
        };
        for (cb, c) in implications_into(space, b) {
            if c == a || cb == ab {
                continue;
            }
            let conclusion = Conclusion::Link {
                link_type: LinkType::Implication,
                outgoing: vec![a, c],
            };
            self.infer(space, cache, RuleKind::Abduction, vec![ab, cb, b], conclusion, out);
        }
    }

    /// A, A→B ⊢ B, when A carries any evidence.
    fn detach(
        &self,
        space: &AtomSpace,
        cache: &mut InferenceCache,
        ab: AtomId,
        out: &mut Vec<InferenceResult>,
    ) {
        let Some((a, b)) = implication(space, ab) else {
            return;
        };
        let asserted = space.truth_value(a).map(|tv| tv.confidence > 0.0).unwrap_or(false);
        if asserted {
            self.infer(space, cache, RuleKind::ModusPonens, vec![a, ab], Conclusion::Atom(b), out);
        }
    }

    fn infer(
        &self,
        space: &AtomSpace,
        cache: &mut InferenceCache,
        rule: RuleKind,
        premises: Vec<AtomId>,
        conclusion: Conclusion,
        out: &mut Vec<InferenceResult>,
    ) {
        let tvs: Option<Vec<TruthValue>> = premises.iter().map(|p| space.truth_value(*p)).collect();
        let Some(tvs) = tvs else {
            return;
        };
        let existing = resolve(space, &conclusion);
        let key = CacheKey::new(rule, premises.clone());

        let cached = cache.get_or_compute(key, premises.iter().copied(), || {
            apply_rule(rule, &tvs).map(|tv| CachedInference::new(existing, tv))
        });
        let Some(cached) = cached else {
            return;
        };

        let tv = cached.truth_value;
        if tv.confidence < self.config.min_confidence {
            return;
        }
        out.push(InferenceResult {
            conclusion,
            rule,
            truth_value: tv,
            confidence: tv.confidence,
            premises_used: premises,
        });
    }

    // =========================================================================
    // COMMITTING
    // =========================================================================

    /// Merge results per conclusion (first-seen order) with revision and
    /// write each merged value that is new or more confident than the stored
    /// one. Returns `(written, created)` ids.
    pub fn commit(
        &self,
        space: &mut AtomSpace,
        bank: &mut AttentionBank,
        cache: &mut InferenceCache,
        results: &[InferenceResult],
    ) -> (Vec<AtomId>, Vec<AtomId>) {
        let mut order: Vec<&Conclusion> = Vec::new();
        let mut groups: HashMap<&Conclusion, Vec<TruthValue>> = HashMap::new();
        for result in results {
            groups
                .entry(&result.conclusion)
                .or_insert_with(|| {
                    order.push(&result.conclusion);
                    Vec::new()
                })
                .push(result.truth_value);
        }

        let gain = self.config.min_confidence_gain;
        let mut written = Vec::new();
        let mut created = Vec::new();

        for conclusion in order {
            let merged = pln::combine(&groups[conclusion]);
            match resolve(space, conclusion) {
                Some(id) => {
                    let Some(stored) = space.truth_value(id) else {
                        continue;
                    };
                    if merged.confidence > stored.confidence + gain {
                        space.set_truth_value(id, merged);
                        cache.invalidate(id);
                        written.push(id);
                        trace!(atom = id.raw(), ?stored, ?merged, "revised conclusion");
                    }
                }
                None => {
                    let Conclusion::Link {
                        link_type,
                        outgoing,
                    } = conclusion
                    else {
                        continue;
                    };
                    match space.add_link_with_tv(*link_type, outgoing.clone(), merged) {
                        Ok(id) => {
                            cache.invalidate(id);
                            written.push(id);
                            created.push(id);
                            if self.config.conclusion_stimulus > 0.0 {
                                bank.stimulate(space, id, self.config.conclusion_stimulus);
                            }
                            trace!(atom = id.raw(), ?merged, "new conclusion");
                        }
                        Err(err) => debug!(%err, "conclusion rejected"),
                    }
                }
            }
        }
        (written, created)
    }
}

fn resolve(space: &AtomSpace, conclusion: &Conclusion) -> Option<AtomId> {
    match conclusion {
        Conclusion::Atom(id) => space.contains(*id).then_some(*id),
        Conclusion::Link {
            link_type,
            outgoing,
        } => space.find_link(*link_type, outgoing),
    }
}

/// `(source, target)` of a binary, non-reflexive implication link.
pub(super) fn implication(space: &AtomSpace, link: AtomId) -> Option<(AtomId, AtomId)> {
    let atom = space.get(link)?;
    if atom.link_type()? != LinkType::Implication {
        return None;
    }
    match atom.outgoing() {
        [a, b] if a != b => Some((*a, *b)),
        _ => None,
    }
}

/// Implications `node → x`, as `(link, x)`, ascending link id.
pub(super) fn implications_from(space: &AtomSpace, node: AtomId) -> Vec<(AtomId, AtomId)> {
    space
        .incoming_by_type(node, LinkType::Implication)
        .into_iter()
        .filter_map(|l| match implication(space, l) {
            Some((a, b)) if a == node => Some((l, b)),
            _ => None,
        })
        .collect()
}

/// Implications `x → node`, as `(link, x)`, ascending link id.
pub(super) fn implications_into(space: &AtomSpace, node: AtomId) -> Vec<(AtomId, AtomId)> {
    space
        .incoming_by_type(node, LinkType::Implication)
        .into_iter()
        .filter_map(|l| match implication(space, l) {
            Some((a, b)) if b == node => Some((l, a)),
            _ => None,
        })
        .collect()
}
