//! Ordered, mutable render layers derived from an attribute set

use crate::generation::attributes::AttributeSet;
use crate::generation::canonical::{attribute_of, canonical_name, trait_of};
use crate::io::configuration::{ASSET_EXTENSION, NONE_TRAIT};
use crate::io::error::{GeneratorError, Result};
use crate::rules::pattern::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stable identity of a layer record within a set and its clones
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(u32);

/// One visual element of a token
///
/// Layers with no file or a `None` trait stay addressable by rules but are
/// never rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    id: LayerId,
    /// Attribute the layer belongs to
    pub attribute: String,
    /// Canonical `Attribute/Trait` name
    pub canonical_name: String,
    /// Asset path, absent when the layer has nothing to draw
    pub file: Option<PathBuf>,
}

impl Layer {
    /// Identity used by move operations
    pub const fn id(&self) -> LayerId {
        self.id
    }

    /// Trait part of the canonical name
    pub fn trait_name(&self) -> &str {
        trait_of(&self.canonical_name)
    }

    /// Whether the compositor should draw this layer
    pub fn is_renderable(&self) -> bool {
        self.file.is_some() && self.trait_name() != NONE_TRAIT
    }
}

/// Ordered layer records for one token
///
/// Mutations address layers by attribute or identity, never by index, so a
/// rule pass does not depend on the order earlier mutations happened in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerSet {
    layers: Vec<Layer>,
    asset_root: PathBuf,
    next_id: u32,
}

impl LayerSet {
    /// One layer per entry of the base stacking order
    ///
    /// Attributes missing from the set resolve to a `None` layer.
    pub fn new<S: AsRef<str>>(
        attributes: &AttributeSet,
        layer_order: &[S],
        asset_root: impl Into<PathBuf>,
    ) -> Self {
        let mut set = Self {
            layers: Vec::with_capacity(layer_order.len()),
            asset_root: asset_root.into(),
            next_id: 0,
        };

        for attribute in layer_order {
            let attribute = attribute.as_ref();
            let trait_name = attributes.get(attribute).unwrap_or(NONE_TRAIT);
            let layer = set.make_layer(&canonical_name(attribute, trait_name));
            set.layers.push(layer);
        }

        set
    }

    fn make_layer(&mut self, canonical: &str) -> Layer {
        let id = LayerId(self.next_id);
        self.next_id += 1;

        let file = (trait_of(canonical) != NONE_TRAIT)
            .then(|| resolve_file(&self.asset_root, canonical));

        Layer {
            id,
            attribute: attribute_of(canonical).to_string(),
            canonical_name: canonical.to_string(),
            file,
        }
    }

    fn index_of_attribute(&self, attribute: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.attribute == attribute)
    }

    fn index_of_layer(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Delete every layer with the attribute, returning how many were removed
    pub fn remove(&mut self, attribute: &str) -> usize {
        debug!(attribute, "removing layers");
        let before = self.layers.len();
        self.layers.retain(|l| l.attribute != attribute);
        before - self.layers.len()
    }

    /// Insert a new layer just before the first layer of the attribute
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::MissingAnchor`] if no layer has the attribute
    pub fn insert_before(&mut self, attribute: &str, canonical: &str) -> Result<Layer> {
        debug!(attribute, layer = canonical, "inserting before");
        self.insert_relative(attribute, canonical, 0, "insert_before")
    }

    /// Insert a new layer just after the first layer of the attribute
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::MissingAnchor`] if no layer has the attribute
    pub fn insert_after(&mut self, attribute: &str, canonical: &str) -> Result<Layer> {
        debug!(attribute, layer = canonical, "inserting after");
        self.insert_relative(attribute, canonical, 1, "insert_after")
    }

    fn insert_relative(
        &mut self,
        attribute: &str,
        canonical: &str,
        offset: usize,
        operation: &'static str,
    ) -> Result<Layer> {
        let index = self
            .index_of_attribute(attribute)
            .ok_or_else(|| GeneratorError::MissingAnchor {
                attribute: attribute.to_string(),
                operation,
            })?;
        let layer = self.make_layer(canonical);
        self.layers.insert(index + offset, layer.clone());
        Ok(layer)
    }

    /// Move an existing layer just before the first layer of the attribute
    ///
    /// The moved layer never anchors itself, so a move relative to its own
    /// attribute needs another layer of that attribute.
    ///
    /// # Errors
    ///
    /// Fails without changing the set if the layer is not present or if no
    /// other layer has the attribute
    pub fn move_before(&mut self, layer: &Layer, attribute: &str) -> Result<()> {
        debug!(layer = layer.canonical_name.as_str(), attribute, "moving before");
        self.relocate(layer, attribute, 0, "move_before")
    }

    /// Move an existing layer just after the first layer of the attribute
    ///
    /// The moved layer never anchors itself, so a move relative to its own
    /// attribute needs another layer of that attribute.
    ///
    /// # Errors
    ///
    /// Fails without changing the set if the layer is not present or if no
    /// other layer has the attribute
    pub fn move_after(&mut self, layer: &Layer, attribute: &str) -> Result<()> {
        debug!(layer = layer.canonical_name.as_str(), attribute, "moving after");
        self.relocate(layer, attribute, 1, "move_after")
    }

    fn relocate(
        &mut self,
        layer: &Layer,
        attribute: &str,
        offset: usize,
        operation: &'static str,
    ) -> Result<()> {
        let index = self
            .index_of_layer(layer.id)
            .ok_or_else(|| GeneratorError::UnknownLayer {
                canonical_name: layer.canonical_name.clone(),
            })?;
        let moved = self.layers.remove(index);

        // Anchor lookup runs against the list with the layer already taken out
        let Some(target) = self.index_of_attribute(attribute) else {
            self.layers.insert(index, moved);
            if layer.attribute == attribute {
                return Err(GeneratorError::SelfReferentialMove {
                    canonical_name: layer.canonical_name.clone(),
                    attribute: attribute.to_string(),
                });
            }
            return Err(GeneratorError::MissingAnchor {
                attribute: attribute.to_string(),
                operation,
            });
        };

        self.layers.insert(target + offset, moved);
        Ok(())
    }

    /// First layer whose canonical name matches, in current order
    pub fn find(&self, pattern: &Pattern) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|l| pattern.is_match(&l.canonical_name))
    }

    /// Whether any layer's canonical name matches
    pub fn has(&self, pattern: &Pattern) -> bool {
        self.find(pattern).is_some()
    }

    /// [`LayerSet::find`] with a glob compiled on the spot
    ///
    /// # Errors
    ///
    /// Returns an error if the glob fails to compile
    pub fn find_glob(&self, glob: &str) -> Result<Option<&Layer>> {
        let pattern = Pattern::glob(glob)?;
        Ok(self.find(&pattern))
    }

    /// [`LayerSet::has`] with a glob compiled on the spot
    ///
    /// # Errors
    ///
    /// Returns an error if the glob fails to compile
    pub fn has_glob(&self, glob: &str) -> Result<bool> {
        Ok(self.find_glob(glob)?.is_some())
    }

    /// Independent copy; mutating it leaves this set untouched
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Layers handed to the compositor, bottom first
    pub fn render_sequence(&self) -> Vec<&Layer> {
        self.layers.iter().filter(|l| l.is_renderable()).collect()
    }

    /// Every layer record, including suppressed ones
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Directory asset paths are resolved against
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Number of layer records
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the set has no layer records
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Asset path for a canonical name: `{root}/{attribute}/{trait}.png`
pub fn resolve_file(asset_root: &Path, canonical: &str) -> PathBuf {
    asset_root.join(format!("{canonical}.{ASSET_EXTENSION}"))
}
