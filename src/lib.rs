//! Rule-driven generation of layered token collections
//!
//! Attribute sets are drawn trait by trait from weighted pools narrowed by
//! pairing rules, then resolved into ordered image layers by pattern-matched
//! layer rules before compositing.

#![forbid(unsafe_code)]

/// Collection statistics, search and duplicate handling
pub mod analysis;
/// Weighted, constraint-filtered attribute generation
pub mod generation;
/// Input/output operations, configuration and error handling
pub mod io;
/// Layer sets, layer rules and blend modes
pub mod layers;
/// Pattern matching, probability tables and rule groups
pub mod rules;

pub use io::error::{GeneratorError, Result};
