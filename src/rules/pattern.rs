//! Glob-style matching over canonical `Attribute/Trait` names

use crate::io::error::{GeneratorError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pattern as written in a project file
///
/// A bare string is a glob; a `{ regex = "..." }` table is used unmodified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    /// `*` matches any substring, everything else is literal
    Glob(String),
    /// Native regular expression
    Regex {
        /// Expression source
        regex: String,
    },
}

impl PatternSpec {
    /// Compile into a reusable matcher
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting expression is invalid
    pub fn compile(&self) -> Result<Pattern> {
        match self {
            Self::Glob(glob) => Pattern::glob(glob),
            Self::Regex { regex } => Pattern::regex(regex),
        }
    }
}

impl From<&str> for PatternSpec {
    fn from(glob: &str) -> Self {
        Self::Glob(glob.to_string())
    }
}

/// Compiled matcher for canonical names
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a glob anchored at both ends
    ///
    /// Only `*` is interpreted; every other character, including parentheses,
    /// matches itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the translated expression fails to compile
    pub fn glob(glob: &str) -> Result<Self> {
        let translated = glob
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex =
            Regex::new(&format!("^{translated}$")).map_err(|source| {
                GeneratorError::InvalidPattern {
                    pattern: glob.to_string(),
                    source,
                }
            })?;

        Ok(Self {
            source: glob.to_string(),
            regex,
        })
    }

    /// Compile a native regular expression without anchoring it
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is invalid
    pub fn regex(expression: &str) -> Result<Self> {
        let regex = Regex::new(expression).map_err(|source| GeneratorError::InvalidPattern {
            pattern: expression.to_string(),
            source,
        })?;

        Ok(Self {
            source: expression.to_string(),
            regex,
        })
    }

    /// Test a candidate canonical name
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Pattern text as declared
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
