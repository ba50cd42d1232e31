/// Glob and regex matchers over canonical names
pub mod pattern;
/// Trait weights keyed by pattern
pub mod probability;
/// Pairing rule groups
pub mod ruleset;
