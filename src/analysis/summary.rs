//! Collection-wide trait statistics written after generation

use crate::generation::attributes::AttributeSet;
use crate::generation::canonical::split_canonical;
use crate::io::configuration::{
    ATTRIBUTE_COUNTS_FILE, NONE_TRAIT, TOKEN_INDEX_FILE, TRAIT_COUNTS_FILE,
};
use crate::io::error::Result;
use crate::io::metadata::{OutputLayout, read_json, write_json};
use crate::rules::pattern::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::{info, warn};

// The literal always compiles; the fallback only disables rollups
static VARIANT_SUFFIX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(.+)\(.+\)$")
        .inspect_err(|err| warn!(%err, "variant suffix pattern rejected, rollups disabled"))
        .ok()
});

/// Trait name with a trailing `(variant)` suffix removed
///
/// Returns `None` when the trait has no variant suffix. The greedy base keeps
/// every suffix but the last.
pub fn trait_without_variant(trait_name: &str) -> Option<&str> {
    VARIANT_SUFFIX
        .as_ref()?
        .captures(trait_name)?
        .get(1)
        .map(|base| base.as_str().trim())
}

/// Ordered counter keyed by first appearance
#[derive(Clone, Debug, Default)]
struct OrderedCounts {
    groups: Vec<(String, Vec<(String, usize)>)>,
}

impl OrderedCounts {
    fn add(&mut self, attribute: &str, trait_name: &str, amount: usize) {
        let group = if let Some(index) = self.groups.iter().position(|(a, _)| a == attribute) {
            self.groups.get_mut(index)
        } else {
            self.groups.push((attribute.to_string(), Vec::new()));
            self.groups.last_mut()
        };
        let Some((_, traits)) = group else {
            return;
        };

        if let Some(entry) = traits.iter_mut().find(|(t, _)| t == trait_name) {
            entry.1 += amount;
        } else {
            traits.push((trait_name.to_string(), amount));
        }
    }

    fn into_sorted_map(mut self) -> Map<String, Value> {
        let mut map = Map::new();
        for (attribute, traits) in &mut self.groups {
            traits.sort_by(|a, b| b.1.cmp(&a.1));
            let counts: Map<String, Value> = traits
                .iter()
                .map(|(t, count)| (t.clone(), Value::from(*count)))
                .collect();
            map.insert(attribute.clone(), Value::Object(counts));
        }
        map
    }
}

/// Per-attribute trait counts, most frequent first
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeCounts {
    /// Counts grouped by trait name without its variant suffix
    pub rollups: Map<String, Value>,
    /// Counts of every trait, including pool traits never picked
    pub summary: Map<String, Value>,
}

impl AttributeCounts {
    /// Count traits over every record
    ///
    /// `pool` lists canonical names that appear with a zero count when never
    /// picked.
    pub fn compute<S: AsRef<str>>(pool: &[S], records: &[(usize, AttributeSet)]) -> Self {
        let mut summary = OrderedCounts::default();
        let mut rollups = OrderedCounts::default();

        for (_, attributes) in records {
            for (attribute, trait_name) in attributes.iter() {
                summary.add(attribute, trait_name, 1);
                if let Some(base) = trait_without_variant(trait_name) {
                    rollups.add(attribute, base, 1);
                }
            }
        }

        for name in pool {
            if let Some((attribute, trait_name)) = split_canonical(name.as_ref()) {
                summary.add(attribute, trait_name, 0);
            }
        }

        Self {
            rollups: rollups.into_sorted_map(),
            summary: summary.into_sorted_map(),
        }
    }

    /// Count recorded for a trait
    pub fn count(&self, attribute: &str, trait_name: &str) -> Option<u64> {
        self.summary.get(attribute)?.get(trait_name)?.as_u64()
    }
}

/// Attribute to trait to token ids, traits sorted by name
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenIndex {
    entries: BTreeMap<String, BTreeMap<String, Vec<usize>>>,
}

impl TokenIndex {
    /// Index every record, listing pool traits never picked with no tokens
    pub fn compute<S: AsRef<str>>(pool: &[S], records: &[(usize, AttributeSet)]) -> Self {
        let mut entries: BTreeMap<String, BTreeMap<String, Vec<usize>>> = BTreeMap::new();

        for (token_id, attributes) in records {
            for (attribute, trait_name) in attributes.iter() {
                entries
                    .entry(attribute.to_string())
                    .or_default()
                    .entry(trait_name.to_string())
                    .or_default()
                    .push(*token_id);
            }
        }

        for name in pool {
            if let Some((attribute, trait_name)) = split_canonical(name.as_ref()) {
                entries
                    .entry(attribute.to_string())
                    .or_default()
                    .entry(trait_name.to_string())
                    .or_default();
            }
        }

        Self { entries }
    }

    /// Token ids holding the exact trait
    pub fn tokens(&self, attribute: &str, trait_name: &str) -> &[usize] {
        self.entries
            .get(attribute)
            .and_then(|traits| traits.get(trait_name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Token ids whose trait for the attribute matches a glob over trait names
    ///
    /// # Errors
    ///
    /// Returns an error if the glob fails to compile
    pub fn tokens_matching(&self, attribute: &str, trait_glob: &str) -> Result<BTreeSet<usize>> {
        let pattern = Pattern::glob(trait_glob)?;
        Ok(self
            .entries
            .get(attribute)
            .into_iter()
            .flatten()
            .filter(|(trait_name, _)| pattern.is_match(trait_name))
            .flat_map(|(_, tokens)| tokens.iter().copied())
            .collect())
    }

    /// Whether the attribute is indexed
    pub fn contains_attribute(&self, attribute: &str) -> bool {
        self.entries.contains_key(attribute)
    }
}

/// Tokens grouped by how many summary attributes are not `None`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitCounts {
    /// Number of tokens per trait count
    pub summary: BTreeMap<usize, usize>,
    /// Token ids per trait count
    pub tokens: BTreeMap<usize, Vec<usize>>,
}

impl TraitCounts {
    /// Group records by their number of present summary attributes
    ///
    /// An attribute missing from a record counts as present.
    pub fn compute(summary_attributes: &[String], records: &[(usize, AttributeSet)]) -> Self {
        let mut counts = Self::default();

        for (token_id, attributes) in records {
            let present = summary_attributes
                .iter()
                .filter(|attribute| attributes.get(attribute) != Some(NONE_TRAIT))
                .count();
            *counts.summary.entry(present).or_default() += 1;
            counts.tokens.entry(present).or_default().push(*token_id);
        }

        counts
    }
}

/// Every summary for one collection
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summaries {
    /// Contents of the attribute counts file
    pub attribute_counts: AttributeCounts,
    /// Contents of the token index file
    pub token_index: TokenIndex,
    /// Contents of the trait counts file
    pub trait_counts: TraitCounts,
}

impl Summaries {
    /// Compute all summaries
    pub fn compute<S: AsRef<str>>(
        pool: &[S],
        records: &[(usize, AttributeSet)],
        summary_attributes: &[String],
    ) -> Self {
        Self {
            attribute_counts: AttributeCounts::compute(pool, records),
            token_index: TokenIndex::compute(pool, records),
            trait_counts: TraitCounts::compute(summary_attributes, records),
        }
    }

    /// Write the three summary files below the output root
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written
    pub fn write(&self, layout: &OutputLayout) -> Result<()> {
        write_json(&layout.file(ATTRIBUTE_COUNTS_FILE), &self.attribute_counts)?;
        write_json(&layout.file(TOKEN_INDEX_FILE), &self.token_index)?;
        write_json(&layout.file(TRAIT_COUNTS_FILE), &self.trait_counts)?;
        info!(output = %layout.root().display(), "wrote summaries");
        Ok(())
    }
}

/// Read a previously written token index
///
/// # Errors
///
/// Returns an error if the index is missing or malformed
pub fn load_token_index(layout: &OutputLayout) -> Result<TokenIndex> {
    read_json(&layout.file(TOKEN_INDEX_FILE))
}
