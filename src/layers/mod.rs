/// Blend mode overrides
pub mod blending;
/// Ordered layer records and their mutation API
pub mod layer_set;
/// Layer rule engine and layer plan
pub mod rules;
