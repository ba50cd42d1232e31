//! Collection-level analysis over generated records

/// Duplicate detection and regeneration
pub mod duplicates;
/// Token lookup by trait globs
pub mod search;
/// Trait counts and token indexes
pub mod summary;
