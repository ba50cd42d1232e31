//! Attribute generation across the fixed pick order

use crate::generation::attributes::AttributeSet;
use crate::generation::canonical::trait_of;
use crate::generation::filter::filter_candidates;
use crate::generation::pool::TraitPool;
use crate::generation::random::DrawSource;
use crate::generation::sampler::{Pick, PickContext, pick_trait};
use crate::generation::weights::TraitWeights;
use crate::io::error::Result;
use crate::rules::probability::ProbabilityTable;
use crate::rules::ruleset::RuleSet;
use std::collections::HashSet;
use tracing::{debug, error};

/// Immutable generation configuration, compiled once per run
#[derive(Clone, Debug, Default)]
pub struct GenerationRules {
    /// Pick sequence; constraining attributes must come first
    pub attribute_order: Vec<String>,
    /// Attributes that may resolve to `None`
    pub optional_attributes: HashSet<String>,
    /// Weighted trait patterns
    pub probabilities: ProbabilityTable,
    /// Groups whose traits must appear together
    pub must_pair: RuleSet,
    /// Groups whose traits must not appear together
    pub must_not_pair: RuleSet,
}

impl GenerationRules {
    /// Whether the attribute may resolve to `None`
    pub fn is_optional(&self, attribute: &str) -> bool {
        self.optional_attributes.contains(attribute)
    }
}

/// Produces one attribute set per token from a shared draw stream
///
/// Holds only read-only state; per-token picks live on the stack of
/// [`AttributeGenerator::generate`].
pub struct AttributeGenerator<'a> {
    rules: &'a GenerationRules,
    pool: &'a TraitPool,
    weights: TraitWeights,
}

impl<'a> AttributeGenerator<'a> {
    /// Resolve pool weights and bind the generator to its configuration
    pub fn new(rules: &'a GenerationRules, pool: &'a TraitPool) -> Self {
        let weights = TraitWeights::resolve(pool, &rules.probabilities);
        Self {
            rules,
            pool,
            weights,
        }
    }

    /// Generate a complete attribute set
    ///
    /// Consumes one draw per attribute in attribute order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GeneratorError::Unsatisfiable`] if a required
    /// attribute has no viable candidate; no partial set is returned.
    pub fn generate<R: DrawSource + ?Sized>(&self, rng: &mut R) -> Result<AttributeSet> {
        let mut attributes = AttributeSet::new();

        for attribute in &self.rules.attribute_order {
            debug!(attribute = attribute.as_str(), "picking attribute");
            let all_possible = self.pool.traits_for(attribute);
            let original_weight = self.weights.total(&all_possible);
            let already_picked = attributes.canonical_names();

            let candidates = filter_candidates(
                &already_picked,
                &all_possible,
                &self.rules.must_pair,
                &self.rules.must_not_pair,
            );

            let context = PickContext {
                attribute: attribute.as_str(),
                optional: self.rules.is_optional(attribute),
                original_weight,
            };

            match pick_trait(&candidates, &self.weights, context, rng) {
                Pick::Picked(canonical) => {
                    attributes.insert(attribute.as_str(), trait_of(&canonical));
                }
                Pick::Unsatisfiable(diagnostics) => {
                    error!(existing = ?attributes, "failed to pick trait for attribute");
                    return Err(diagnostics.into());
                }
            }
        }

        Ok(attributes)
    }

    /// Draws consumed by one call to [`AttributeGenerator::generate`]
    pub fn draws_per_token(&self) -> usize {
        self.rules.attribute_order.len()
    }

    /// Advance the stream past `tokens` tokens without generating them
    pub fn skip_tokens<R: DrawSource + ?Sized>(&self, rng: &mut R, tokens: usize) {
        rng.skip(tokens * self.draws_per_token());
    }

    /// Weights resolved for the bound pool
    pub const fn weights(&self) -> &TraitWeights {
        &self.weights
    }
}
