//! Ordered attribute to trait mapping for a single token

use crate::generation::canonical::canonical_name;
use crate::io::configuration::NONE_TRAIT;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Chosen trait name per attribute, in insertion order
///
/// Serializes as a JSON object whose key order is the insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttributeSet {
    entries: Vec<(String, String)>,
}

impl AttributeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trait for an attribute, replacing any previous value in place
    pub fn insert(&mut self, attribute: impl Into<String>, trait_name: impl Into<String>) {
        let attribute = attribute.into();
        let trait_name = trait_name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(a, _)| *a == attribute) {
            entry.1 = trait_name;
        } else {
            self.entries.push((attribute, trait_name));
        }
    }

    /// Trait chosen for an attribute
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(a, _)| a == attribute)
            .map(|(_, t)| t.as_str())
    }

    /// Remove an attribute, returning its trait
    pub fn remove(&mut self, attribute: &str) -> Option<String> {
        let index = self.entries.iter().position(|(a, _)| a == attribute)?;
        Some(self.entries.remove(index).1)
    }

    /// Whether the attribute has a trait
    pub fn contains(&self, attribute: &str) -> bool {
        self.get(attribute).is_some()
    }

    /// Attribute and trait pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    /// Canonical names of every entry in insertion order
    pub fn canonical_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(a, t)| canonical_name(a, t))
            .collect()
    }

    /// Copy without `None` traits
    pub fn without_none(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(_, t)| t != NONE_TRAIT)
                .cloned()
                .collect(),
        }
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no attribute has been set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A: Into<String>, T: Into<String>> FromIterator<(A, T)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (A, T)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (attribute, trait_name) in iter {
            set.insert(attribute, trait_name);
        }
        set
    }
}

impl Serialize for AttributeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (attribute, trait_name) in &self.entries {
            map.serialize_entry(attribute, trait_name)?;
        }
        map.end()
    }
}

struct AttributeSetVisitor;

impl<'de> Visitor<'de> for AttributeSetVisitor {
    type Value = AttributeSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of attribute names to trait names")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut set = AttributeSet::new();
        while let Some((attribute, trait_name)) = access.next_entry::<String, String>()? {
            set.insert(attribute, trait_name);
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for AttributeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeSetVisitor)
    }
}
