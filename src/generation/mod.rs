/// Ordered attribute to trait mapping
pub mod attributes;
/// Token range generation with skipping and fast-forward
pub mod batch;
/// Canonical name helpers
pub mod canonical;
/// Attribute generation orchestration
pub mod engine;
/// Constraint filtering by pairing rules
pub mod filter;
/// Trait pool assembly
pub mod pool;
/// Replayable draw streams
pub mod random;
/// Weighted trait selection
pub mod sampler;
/// Resolved per-trait weights
pub mod weights;
