//! Pairing rule groups compiled from author declarations

use crate::io::error::Result;
use crate::rules::pattern::{Pattern, PatternSpec};

/// Patterns evaluated together as one unit
#[derive(Clone, Debug)]
pub struct RuleGroup {
    patterns: Vec<Pattern>,
}

impl RuleGroup {
    /// Compile one group of pattern declarations
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern fails to compile
    pub fn compile(specs: &[PatternSpec]) -> Result<Self> {
        let patterns = specs
            .iter()
            .map(PatternSpec::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Whether any pattern in the group matches the canonical name
    pub fn matches(&self, canonical_name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(canonical_name))
    }

    /// Whether any pattern matches any of the canonical names
    pub fn matches_any<S: AsRef<str>>(&self, canonical_names: &[S]) -> bool {
        canonical_names.iter().any(|name| self.matches(name.as_ref()))
    }

    /// Compiled patterns in declaration order
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}

/// Ordered collection of rule groups
///
/// Groups are evaluated independently; several can apply to the same pick.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    groups: Vec<RuleGroup>,
}

impl RuleSet {
    /// Compile every group of a declared rule set
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern fails to compile
    pub fn compile(declarations: &[Vec<PatternSpec>]) -> Result<Self> {
        let groups = declarations
            .iter()
            .map(|group| RuleGroup::compile(group))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { groups })
    }

    /// Rule groups in declaration order
    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    /// Number of rule groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the set declares no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
