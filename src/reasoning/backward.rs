//! Backward chaining.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, trace};

use super::forward::{implication, implications_from, implications_into};
use super::ReasonerConfig;
use crate::cache::{CacheKey, CachedInference, InferenceCache};
use crate::pln::{self, apply_rule, RuleKind};
use crate::{AtomId, AtomSpace, TruthValue};

/// A derived truth value for a goal atom.
#[derive(Clone, Debug, PartialEq)]
pub struct Proof {
    pub target: AtomId,
    pub truth_value: TruthValue,
    /// `Chain` or `ModusPonens` for a single derivation, `Revision` when
    /// several pieces of evidence were merged.
    pub rule: RuleKind,
    /// Links and middle terms read, first-seen order.
    pub premises: Vec<AtomId>,
    /// Whether the value was written back.
    pub committed: bool,
}

/// Goal-driven chaining with seeded sub-goal sampling.
pub struct BackwardChainer {
    config: ReasonerConfig,
    rng: StdRng,
}

impl BackwardChainer {
    pub fn new(config: ReasonerConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Derive a truth value for `target` without writing it.
    ///
    /// An implication `A→C` is proven by chains `A→B₁→…→C` of at most
    /// `backward_max_depth` links, each composed by deduction and revised
    /// with the link's own evidence. A node `B` is proven by modus ponens
    /// over every `A→B` whose `A` carries evidence. `None` if nothing could
    /// be derived.
    pub fn prove(
        &mut self,
        space: &AtomSpace,
        cache: &mut InferenceCache,
        target: AtomId,
    ) -> Option<Proof> {
        let atom = space.get(target)?;
        if let Some((a, c)) = implication(space, target) {
            self.prove_implication(space, cache, target, a, c)
        } else if atom.is_node() {
            self.prove_node(space, cache, target)
        } else {
            None
        }
    }

    /// [`prove`](Self::prove), then write the result if it is more confident
    /// than the stored value by more than `min_confidence_gain`.
    pub fn prove_and_commit(
        &mut self,
        space: &mut AtomSpace,
        cache: &mut InferenceCache,
        target: AtomId,
    ) -> Option<Proof> {
        let mut proof = self.prove(space, cache, target)?;
        let stored = space.truth_value(target)?;
        if proof.truth_value.confidence > stored.confidence + self.config.min_confidence_gain {
            space.set_truth_value(target, proof.truth_value);
            cache.invalidate(target);
            proof.committed = true;
        }
        Some(proof)
    }

    fn prove_implication(
        &mut self,
        space: &AtomSpace,
        cache: &mut InferenceCache,
        target: AtomId,
        source: AtomId,
        goal: AtomId,
    ) -> Option<Proof> {
        let mut chains = Vec::new();
        let mut links = Vec::new();
        let mut visited = vec![source];
        self.search(space, target, source, goal, &mut links, &mut visited, &mut chains);
        trace!(target = target.raw(), chains = chains.len(), "backward search");

        let mut evidence = Vec::new();
        let mut premises: Vec<AtomId> = Vec::new();
        for chain in chains {
            let mut ids = Vec::with_capacity(chain.len() * 2);
            for (i, link) in chain.iter().enumerate() {
                ids.push(*link);
                if i + 1 < chain.len() {
                    ids.push(space.outgoing(*link)[1]);
                }
            }
            let Some(tv) = self.cached(space, cache, RuleKind::Chain, ids.clone(), target) else {
                continue;
            };
            evidence.push(tv);
            for id in ids {
                if !premises.contains(&id) {
                    premises.push(id);
                }
            }
        }

        self.conclude(space, target, RuleKind::Chain, evidence, premises)
    }

    fn prove_node(
        &mut self,
        space: &AtomSpace,
        cache: &mut InferenceCache,
        target: AtomId,
    ) -> Option<Proof> {
        let asserted: Vec<(AtomId, AtomId)> = implications_into(space, target)
            .into_iter()
            .filter(|(_, a)| {
                space
                    .truth_value(*a)
                    .map(|tv| tv.confidence > 0.0)
                    .unwrap_or(false)
            })
            .collect();
        let candidates = self.sample(asserted);

        let mut evidence = Vec::new();
        let mut premises = Vec::new();
        for (link, a) in candidates {
            let ids = vec![a, link];
            if let Some(tv) = self.cached(space, cache, RuleKind::ModusPonens, ids, target) {
                evidence.push(tv);
                premises.push(a);
                premises.push(link);
            }
        }

        self.conclude(space, target, RuleKind::ModusPonens, evidence, premises)
    }

    /// Depth-first search for implication chains `node → … → goal`.
    #[allow(clippy::too_many_arguments)]
    fn search(
        &mut self,
        space: &AtomSpace,
        target: AtomId,
        node: AtomId,
        goal: AtomId,
        links: &mut Vec<AtomId>,
        visited: &mut Vec<AtomId>,
        chains: &mut Vec<Vec<AtomId>>,
    ) {
        if links.len() >= self.config.backward_max_depth {
            return;
        }
        let next: Vec<(AtomId, AtomId)> = implications_from(space, node)
            .into_iter()
            .filter(|(link, x)| *link != target && !visited.contains(x))
            .collect();

        for (link, x) in self.sample(next) {
            links.push(link);
            if x == goal {
                chains.push(links.clone());
            } else {
                visited.push(x);
                self.search(space, target, x, goal, links, visited, chains);
                visited.pop();
            }
            links.pop();
        }
    }

    /// At most `backward_branching` candidates; sampled when there are more.
    fn sample(&mut self, mut candidates: Vec<(AtomId, AtomId)>) -> Vec<(AtomId, AtomId)> {
        let k = self.config.backward_branching;
        if candidates.len() > k {
            candidates = candidates.choose_multiple(&mut self.rng, k).copied().collect();
            candidates.sort_unstable();
        }
        candidates
    }

    fn cached(
        &self,
        space: &AtomSpace,
        cache: &mut InferenceCache,
        rule: RuleKind,
        premises: Vec<AtomId>,
        target: AtomId,
    ) -> Option<TruthValue> {
        let tvs: Vec<TruthValue> = premises
            .iter()
            .map(|p| space.truth_value(*p))
            .collect::<Option<_>>()?;
        let key = CacheKey::new(rule, premises.clone());
        let result = cache.get_or_compute(key, premises, || {
            apply_rule(rule, &tvs).map(|tv| CachedInference::new(Some(target), tv))
        })?;
        let tv = result.truth_value;
        (tv.confidence >= self.config.min_confidence).then_some(tv)
    }

    fn conclude(
        &self,
        space: &AtomSpace,
        target: AtomId,
        single_rule: RuleKind,
        mut evidence: Vec<TruthValue>,
        premises: Vec<AtomId>,
    ) -> Option<Proof> {
        if evidence.is_empty() {
            return None;
        }
        if let Some(direct) = space.truth_value(target).filter(|tv| tv.has_evidence()) {
            evidence.push(direct);
        }
        let rule = if evidence.len() == 1 {
            single_rule
        } else {
            RuleKind::Revision
        };
        let truth_value = pln::combine(&evidence);
        debug!(
            target = target.raw(),
            evidence = evidence.len(),
            ?truth_value,
            "backward proof"
        );
        Some(Proof {
            target,
            truth_value,
            rule,
            premises,
            committed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::{LinkType, NodeType};

    fn tv(s: f64, c: f64) -> TruthValue {
        TruthValue::new(s, c)
    }

    #[test]
    fn test_proves_implication_through_chain() {
        let mut space = AtomSpace::new();
        let a = space.add_node_with_tv(NodeType::Concept, "A", tv(0.9, 0.9));
        let b = space.add_node_with_tv(NodeType::Concept, "B", tv(0.8, 0.8));
        let c = space.add_node(NodeType::Concept, "C");
        let ab = space
            .add_link_with_tv(LinkType::Implication, vec![a, b], tv(0.9, 0.8))
            .unwrap();
        let bc = space
            .add_link_with_tv(LinkType::Implication, vec![b, c], tv(0.8, 0.7))
            .unwrap();
        let ac = space.add_link(LinkType::Implication, vec![a, c]).unwrap();

        let mut cache = InferenceCache::new(CacheConfig::default());
        let mut bc_chainer = BackwardChainer::new(ReasonerConfig::default());
        let proof = bc_chainer.prove(&space, &mut cache, ac).unwrap();

        assert_eq!(proof.rule, RuleKind::Chain);
        assert_eq!(proof.premises, vec![ab, b, bc]);
        assert!((proof.truth_value.strength - 0.8).abs() < 1e-6);
        assert!(!proof.committed);
    }

    #[test]
    fn test_chain_result_is_cached() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "A");
        let b = space.add_node_with_tv(NodeType::Concept, "B", tv(0.5, 0.9));
        let c = space.add_node(NodeType::Concept, "C");
        space
            .add_link_with_tv(LinkType::Implication, vec![a, b], tv(0.9, 0.9))
            .unwrap();
        space
            .add_link_with_tv(LinkType::Implication, vec![b, c], tv(0.9, 0.9))
            .unwrap();
        let ac = space.add_link(LinkType::Implication, vec![a, c]).unwrap();

        let mut cache = InferenceCache::new(CacheConfig::default());
        let mut chainer = BackwardChainer::new(ReasonerConfig::default());
        chainer.prove(&space, &mut cache, ac).unwrap();
        chainer.prove(&space, &mut cache, ac).unwrap();
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_proves_node_by_modus_ponens() {
        let mut space = AtomSpace::new();
        let rain = space.add_node_with_tv(NodeType::Predicate, "rain", tv(0.9, 0.9));
        let wet = space.add_node(NodeType::Predicate, "wet");
        space
            .add_link_with_tv(LinkType::Implication, vec![rain, wet], tv(0.8, 0.9))
            .unwrap();

        let mut cache = InferenceCache::new(CacheConfig::default());
        let mut chainer = BackwardChainer::new(ReasonerConfig::default());
        let proof = chainer.prove_and_commit(&mut space, &mut cache, wet).unwrap();

        assert_eq!(proof.rule, RuleKind::ModusPonens);
        assert!(proof.committed);
        let stored = space.truth_value(wet).unwrap();
        assert!((stored.strength - 0.72).abs() < 1e-9);
        assert!((stored.confidence - 0.81).abs() < 1e-9);
    }

    #[test]
    fn test_depth_limit() {
        let mut space = AtomSpace::new();
        let nodes: Vec<AtomId> = (0..5)
            .map(|i| space.add_node_with_tv(NodeType::Concept, format!("n{i}"), tv(0.9, 0.9)))
            .collect();
        for w in nodes.windows(2) {
            space
                .add_link_with_tv(LinkType::Implication, vec![w[0], w[1]], tv(0.9, 0.9))
                .unwrap();
        }
        let target = space
            .add_link(LinkType::Implication, vec![nodes[0], nodes[4]])
            .unwrap();

        let mut cache = InferenceCache::new(CacheConfig::default());
        let mut shallow = BackwardChainer::new(ReasonerConfig::default());
        assert!(shallow.prove(&space, &mut cache, target).is_none());

        let mut deep = BackwardChainer::new(ReasonerConfig {
            backward_max_depth: 4,
            ..Default::default()
        });
        assert!(deep.prove(&space, &mut cache, target).is_some());
    }

    #[test]
    fn test_unprovable_targets() {
        let mut space = AtomSpace::new();
        let a = space.add_node(NodeType::Concept, "A");
        let list = space.add_link(LinkType::List, vec![a]).unwrap();
        let mut cache = InferenceCache::new(CacheConfig::default());
        let mut chainer = BackwardChainer::new(ReasonerConfig::default());
        assert!(chainer.prove(&space, &mut cache, a).is_none());
        assert!(chainer.prove(&space, &mut cache, list).is_none());
        assert!(chainer.prove(&space, &mut cache, AtomId(42)).is_none());
    }
}
