//! Token lookup by trait globs

use crate::generation::attributes::AttributeSet;
use crate::generation::canonical::split_canonical;
use crate::io::error::{Result, invalid_parameter};
use crate::rules::pattern::Pattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One `Attribute/TraitGlob` search term
#[derive(Clone, Debug)]
pub struct TraitQuery {
    attribute: String,
    pattern: Pattern,
}

impl TraitQuery {
    /// Parse `Attribute/TraitGlob`; the glob applies to the trait name only
    ///
    /// # Errors
    ///
    /// Returns an error if the query has no attribute part or the glob fails
    /// to compile
    pub fn parse(query: &str) -> Result<Self> {
        let (attribute, trait_glob) = split_canonical(query).ok_or_else(|| {
            invalid_parameter("traits", &query, &"expected Attribute/TraitGlob")
        })?;
        Ok(Self {
            attribute: attribute.to_string(),
            pattern: Pattern::glob(trait_glob)?,
        })
    }

    /// Attribute the query applies to
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Whether the set's trait for the attribute matches
    pub fn matches(&self, attributes: &AttributeSet) -> bool {
        attributes
            .get(&self.attribute)
            .is_some_and(|trait_name| self.pattern.is_match(trait_name))
    }
}

impl FromStr for TraitQuery {
    type Err = crate::io::error::GeneratorError;

    fn from_str(query: &str) -> Result<Self> {
        Self::parse(query)
    }
}

/// How search results are printed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchFormat {
    /// Pretty JSON array of token ids
    #[default]
    Json,
    /// Space separated token ids
    List,
}

/// Token ids whose attribute sets match every query
pub fn search(records: &[(usize, AttributeSet)], queries: &[TraitQuery]) -> Vec<usize> {
    records
        .iter()
        .filter(|(_, attributes)| queries.iter().all(|query| query.matches(attributes)))
        .map(|(token_id, _)| *token_id)
        .collect()
}

/// Search results ready for printing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResults {
    /// Matching token ids in ascending order
    pub token_ids: Vec<usize>,
    /// Output format
    pub format: SearchFormat,
}

impl fmt::Display for SearchResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            SearchFormat::Json => {
                let text =
                    serde_json::to_string_pretty(&self.token_ids).map_err(|_err| fmt::Error)?;
                f.write_str(&text)
            }
            SearchFormat::List => {
                let ids: Vec<String> = self.token_ids.iter().map(ToString::to_string).collect();
                f.write_str(&ids.join(" "))
            }
        }
    }
}
