//! Energy scheme: weighted feature terms composed over a configuration.

use std::sync::Arc;

use mpp_core::{MarkId, MppError};
use mpp_image::ChannelStack;
use mpp_model::{Configuration, Mark};
use serde::{Deserialize, Serialize};

use crate::cache::{FeatureCache, FeatureSlot};
use crate::features::{PairwiseFeature, UnaryFeature};

/// How weighted term contributions combine into one scalar.
///
/// Only the additive policy admits local energy deltas; the others recompute
/// both totals when a delta is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CombinePolicy {
    /// Weighted linear sum of all contributions (the default).
    #[default]
    Sum,
    /// Largest single contribution.
    Max,
    /// Product of all contributions.
    Product,
}

/// One weighted unary term of a scheme.
pub struct UnaryTerm {
    /// Feature evaluated once per mark.
    pub feature: Arc<dyn UnaryFeature>,
    /// Scalar weight applied to the feature value.
    pub weight: f64,
}

/// One weighted pairwise term of a scheme.
pub struct PairwiseTerm {
    /// Feature evaluated once per interacting unordered mark pair.
    pub feature: Arc<dyn PairwiseFeature>,
    /// Scalar weight applied to the feature value.
    pub weight: f64,
}

/// The scoring function mapping a configuration to a scalar energy.
///
/// Immutable after construction. Pairs whose centre distance exceeds the
/// interaction radius contribute zero by definition and are skipped.
pub struct EnergyScheme {
    unary: Vec<UnaryTerm>,
    pairwise: Vec<PairwiseTerm>,
    interaction_radius: f64,
    policy: CombinePolicy,
}

impl EnergyScheme {
    /// Assembles a scheme from its terms.
    pub fn new(
        unary: Vec<UnaryTerm>,
        pairwise: Vec<PairwiseTerm>,
        interaction_radius: f64,
        policy: CombinePolicy,
    ) -> Self {
        Self {
            unary,
            pairwise,
            interaction_radius,
            policy,
        }
    }

    /// Returns the interaction radius for pairwise terms.
    pub fn interaction_radius(&self) -> f64 {
        self.interaction_radius
    }

    /// Returns the combination policy.
    pub fn policy(&self) -> CombinePolicy {
        self.policy
    }

    /// Whether two marks are close enough for pairwise terms to apply.
    pub fn interacts(&self, a: &Mark, b: &Mark) -> bool {
        a.position().distance_to(b.position()) <= self.interaction_radius
    }

    /// Total energy of a configuration.
    ///
    /// An empty configuration has zero energy under every policy.
    pub fn total_energy(
        &self,
        configuration: &Configuration,
        stack: &ChannelStack,
        cache: &FeatureCache,
    ) -> Result<f64, MppError> {
        let mut contributions = Vec::new();
        self.collect_unary(configuration.marks().iter().map(Arc::as_ref), stack, cache, &mut contributions)?;
        let marks = configuration.marks();
        for (index, a) in marks.iter().enumerate() {
            for b in marks.iter().skip(index + 1) {
                if self.interacts(a, b) {
                    self.collect_pairwise(a, b, stack, cache, &mut contributions)?;
                }
            }
        }
        Ok(self.combine(&contributions))
    }

    /// Energy difference `total(candidate) - total(current)` for a change
    /// touching a single mark.
    ///
    /// Under the additive policy only terms touching the changed mark are
    /// re-evaluated: its unary terms plus pairwise terms against marks
    /// within the interaction radius, in each configuration. Other policies
    /// recompute both totals. Either way the result equals the full
    /// recomputation difference.
    pub fn energy_delta(
        &self,
        current: &Configuration,
        candidate: &Configuration,
        touched: MarkId,
        stack: &ChannelStack,
        cache: &FeatureCache,
    ) -> Result<f64, MppError> {
        if self.policy != CombinePolicy::Sum {
            let before = self.total_energy(current, stack, cache)?;
            let after = self.total_energy(candidate, stack, cache)?;
            return Ok(after - before);
        }
        let before = self.local_energy(current, touched, stack, cache)?;
        let after = self.local_energy(candidate, touched, stack, cache)?;
        Ok(after - before)
    }

    /// Sum of the terms touching one mark: its unary contributions and its
    /// pairwise contributions against interacting partners. Zero when the
    /// mark is absent (the empty side of a birth or death).
    fn local_energy(
        &self,
        configuration: &Configuration,
        touched: MarkId,
        stack: &ChannelStack,
        cache: &FeatureCache,
    ) -> Result<f64, MppError> {
        let mark = match configuration.get(touched) {
            Some(mark) => mark,
            None => return Ok(0.0),
        };
        let mut contributions = Vec::new();
        self.collect_unary(std::iter::once(mark.as_ref()), stack, cache, &mut contributions)?;
        for partner in configuration.marks() {
            if partner.id() != touched && self.interacts(mark, partner) {
                self.collect_pairwise(mark, partner, stack, cache, &mut contributions)?;
            }
        }
        Ok(contributions.iter().sum())
    }

    fn collect_unary<'a>(
        &self,
        marks: impl Iterator<Item = &'a Mark>,
        stack: &ChannelStack,
        cache: &FeatureCache,
        contributions: &mut Vec<f64>,
    ) -> Result<(), MppError> {
        for mark in marks {
            for (slot, term) in self.unary.iter().enumerate() {
                let value =
                    cache.evaluate_unary(FeatureSlot(slot), term.feature.as_ref(), mark, stack)?;
                contributions.push(term.weight * value);
            }
        }
        Ok(())
    }

    fn collect_pairwise(
        &self,
        a: &Mark,
        b: &Mark,
        stack: &ChannelStack,
        cache: &FeatureCache,
        contributions: &mut Vec<f64>,
    ) -> Result<(), MppError> {
        for (slot, term) in self.pairwise.iter().enumerate() {
            // Pairwise slots live after the unary slots in the key space.
            let slot = FeatureSlot(self.unary.len() + slot);
            let value = cache.evaluate_pairwise(slot, term.feature.as_ref(), a, b, stack)?;
            contributions.push(term.weight * value);
        }
        Ok(())
    }

    fn combine(&self, contributions: &[f64]) -> f64 {
        if contributions.is_empty() {
            return 0.0;
        }
        match self.policy {
            CombinePolicy::Sum => contributions.iter().sum(),
            CombinePolicy::Max => contributions.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            CombinePolicy::Product => contributions.iter().product(),
        }
    }
}

impl std::fmt::Debug for EnergyScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnergyScheme")
            .field("unary_terms", &self.unary.len())
            .field("pairwise_terms", &self.pairwise.len())
            .field("interaction_radius", &self.interaction_radius)
            .field("policy", &self.policy)
            .finish()
    }
}
