//! Trait pool assembled from discovered assets

use crate::generation::canonical::{attribute_of, belongs_to, canonical_name};
use crate::generation::random::{DrawSource, shuffle};
use crate::io::configuration::NONE_TRAIT;
use crate::rules::probability::ProbabilityTable;
use std::collections::HashSet;

/// Ordered canonical trait names available to generation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraitPool {
    entries: Vec<String>,
}

impl TraitPool {
    /// Use canonical names exactly as given
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Build a pool from discovered asset names
    ///
    /// Names no probability pattern covers are dropped. Each optional attribute
    /// gets a synthetic `Attribute/None` entry just before its first trait.
    pub fn from_assets<S: AsRef<str>>(
        canonical_names: &[S],
        optional_attributes: &HashSet<String>,
        probabilities: &ProbabilityTable,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(canonical_names.len());

        for name in canonical_names {
            let name = name.as_ref();
            if !probabilities.covers(name) {
                continue;
            }

            let attribute = attribute_of(name);
            if optional_attributes.contains(attribute) && !seen.contains(attribute) {
                entries.push(canonical_name(attribute, NONE_TRAIT));
            }
            seen.insert(attribute.to_string());
            entries.push(name.to_string());
        }

        Self { entries }
    }

    /// Every entry belonging to the attribute, in pool order
    pub fn traits_for(&self, attribute: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| belongs_to(entry, attribute))
            .map(String::as_str)
            .collect()
    }

    /// Reorder the pool in place with the given stream
    pub fn shuffle<R: DrawSource + ?Sized>(&mut self, rng: &mut R) {
        shuffle(&mut self.entries, rng);
    }

    /// All entries in pool order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
