//! Trait probability table with first-match weight resolution

use crate::io::error::{GeneratorError, Result};
use crate::rules::pattern::{Pattern, PatternSpec};
use serde::{Deserialize, Serialize};

/// One weighted pattern as declared in a project file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitWeight {
    /// Pattern over canonical names
    pub pattern: PatternSpec,
    /// Relative weight within the trait's attribute
    pub weight: f64,
}

/// Compiled weighted patterns in declaration order
#[derive(Clone, Debug, Default)]
pub struct ProbabilityTable {
    entries: Vec<(Pattern, f64)>,
}

impl ProbabilityTable {
    /// Compile weighted pattern declarations
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile or a weight is negative
    /// or not finite
    pub fn compile(declarations: &[TraitWeight]) -> Result<Self> {
        let mut entries = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            let pattern = declaration.pattern.compile()?;
            if !declaration.weight.is_finite() || declaration.weight < 0.0 {
                return Err(GeneratorError::InvalidWeight {
                    pattern: pattern.source().to_string(),
                    weight: declaration.weight,
                });
            }
            entries.push((pattern, declaration.weight));
        }
        Ok(Self { entries })
    }

    /// Weight of the first pattern matching the canonical name
    ///
    /// Returns `None` when nothing matches.
    pub fn lookup(&self, canonical_name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(pattern, _)| pattern.is_match(canonical_name))
            .map(|&(_, weight)| weight)
    }

    /// Resolved weight, zero when no pattern matches
    pub fn weight_of(&self, canonical_name: &str) -> f64 {
        self.lookup(canonical_name).unwrap_or(0.0)
    }

    /// Whether any pattern matches the canonical name
    pub fn covers(&self, canonical_name: &str) -> bool {
        self.lookup(canonical_name).is_some()
    }

    /// Every pattern matching the canonical name, in declaration order
    pub fn matching_patterns(&self, canonical_name: &str) -> Vec<&Pattern> {
        self.entries
            .iter()
            .filter(|(pattern, _)| pattern.is_match(canonical_name))
            .map(|(pattern, _)| pattern)
            .collect()
    }

    /// Reject traits whose weight depends on declaration order
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::AmbiguousProbability`] for the first trait
    /// matching more than one pattern
    pub fn ensure_unambiguous<S: AsRef<str>>(&self, canonical_names: &[S]) -> Result<()> {
        for name in canonical_names {
            let matches = self.matching_patterns(name.as_ref());
            if matches.len() > 1 {
                return Err(GeneratorError::AmbiguousProbability {
                    canonical_name: name.as_ref().to_string(),
                    patterns: matches.iter().map(|p| p.source().to_string()).collect(),
                });
            }
        }
        Ok(())
    }

    /// Number of declared patterns
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no patterns are declared
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
