//! Canonical `Attribute/Trait` naming helpers
//!
//! The first slash separates the attribute from the trait.

/// Join an attribute and trait into a canonical name
pub fn canonical_name(attribute: &str, trait_name: &str) -> String {
    format!("{attribute}/{trait_name}")
}

/// Split a canonical name at its first slash
pub fn split_canonical(canonical: &str) -> Option<(&str, &str)> {
    canonical.split_once('/')
}

/// Attribute part of a canonical name, or the whole name if it has no slash
pub fn attribute_of(canonical: &str) -> &str {
    split_canonical(canonical).map_or(canonical, |(attribute, _)| attribute)
}

/// Trait part of a canonical name, or the whole name if it has no slash
pub fn trait_of(canonical: &str) -> &str {
    split_canonical(canonical).map_or(canonical, |(_, trait_name)| trait_name)
}

/// Whether the canonical name belongs to the attribute
pub fn belongs_to(canonical: &str, attribute: &str) -> bool {
    canonical
        .strip_prefix(attribute)
        .is_some_and(|rest| rest.starts_with('/'))
}
