//! Per-trait weights resolved once from the probability table

use crate::generation::pool::TraitPool;
use crate::rules::probability::ProbabilityTable;
use std::collections::HashMap;

/// Resolved weight for every trait in a pool
///
/// Pattern matching happens once here instead of on every pick.
#[derive(Clone, Debug, Default)]
pub struct TraitWeights {
    weights: HashMap<String, f64>,
}

impl TraitWeights {
    /// Resolve every pool entry against the table
    pub fn resolve(pool: &TraitPool, table: &ProbabilityTable) -> Self {
        Self::from_names(pool.entries(), table)
    }

    /// Resolve arbitrary canonical names against the table
    pub fn from_names<S: AsRef<str>>(names: &[S], table: &ProbabilityTable) -> Self {
        let weights = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), table.weight_of(name))
            })
            .collect();
        Self { weights }
    }

    /// Weight of a trait, zero if unknown
    pub fn weight(&self, canonical_name: &str) -> f64 {
        self.weights.get(canonical_name).copied().unwrap_or(0.0)
    }

    /// Sum of weights over the given traits
    pub fn total<S: AsRef<str>>(&self, canonical_names: &[S]) -> f64 {
        canonical_names
            .iter()
            .map(|name| self.weight(name.as_ref()))
            .sum()
    }
}
