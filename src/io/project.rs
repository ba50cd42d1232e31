//! Project file parsing and one-time compilation into immutable rules

use crate::generation::canonical::attribute_of;
use crate::generation::engine::GenerationRules;
use crate::generation::pool::TraitPool;
use crate::io::assets::discover_assets;
use crate::io::configuration::{DEFAULT_ASSET_ROOT, DEFAULT_IMAGE_SIZE, DEFAULT_OUTPUT_ROOT};
use crate::io::error::{GeneratorError, Result, WithPath, invalid_parameter};
use crate::layers::blending::{BlendRuleSpec, BlendRules};
use crate::layers::rules::{LayerPlan, LayerRuleSpec, LayerRules};
use crate::rules::pattern::PatternSpec;
use crate::rules::probability::{ProbabilityTable, TraitWeight};
use crate::rules::ruleset::RuleSet;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Raw project file contents
#[derive(Clone, Debug, Deserialize)]
pub struct ProjectConfig {
    /// Directory holding `{attribute}/{trait}.png` assets
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,
    /// Directory receiving metadata, summaries and images
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Pick sequence for generation
    pub attribute_order: Vec<String>,
    /// Attributes that may resolve to `None`
    #[serde(default)]
    pub optional_attributes: Vec<String>,
    /// Attributes counted for the trait-count summary
    #[serde(default)]
    pub summary_optional_attributes: Vec<String>,
    /// Base stacking order, defaults to the attribute order
    #[serde(default)]
    pub layer_order: Vec<String>,
    /// Shuffle the trait pool with the seeded stream before generating
    #[serde(default = "default_true")]
    pub shuffle_pool: bool,
    /// Edge length of rendered images
    #[serde(default = "default_image_size")]
    pub image_size: u32,
    /// Weighted trait patterns
    #[serde(default)]
    pub traits: Vec<TraitWeight>,
    /// Groups whose traits must appear together
    #[serde(default)]
    pub must_pair: Vec<Vec<PatternSpec>>,
    /// Groups whose traits must not appear together
    #[serde(default)]
    pub must_not_pair: Vec<Vec<PatternSpec>>,
    /// Layer rules in priority order
    #[serde(default)]
    pub layer_rules: Vec<LayerRuleSpec>,
    /// Blend overrides in priority order
    #[serde(default)]
    pub blend_rules: Vec<BlendRuleSpec>,
    /// Transform applied to public metadata
    #[serde(default)]
    pub final_metadata: FinalMetadataConfig,
    /// Duplicate detection settings
    #[serde(default)]
    pub duplicates: DuplicateConfig,
}

/// Public metadata transform
#[derive(Clone, Debug, Deserialize)]
pub struct FinalMetadataConfig {
    /// Omit traits equal to `None`
    #[serde(default = "default_true")]
    pub drop_none: bool,
    /// Attributes never published
    #[serde(default)]
    pub hidden_attributes: Vec<String>,
}

impl Default for FinalMetadataConfig {
    fn default() -> Self {
        Self {
            drop_none: true,
            hidden_attributes: Vec::new(),
        }
    }
}

/// Duplicate detection settings
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DuplicateConfig {
    /// Attributes left out of the uniqueness hash
    #[serde(default)]
    pub ignore_attributes: Vec<String>,
}

fn default_asset_root() -> PathBuf {
    PathBuf::from(DEFAULT_ASSET_ROOT)
}

fn default_output_root() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_ROOT)
}

const fn default_true() -> bool {
    true
}

const fn default_image_size() -> u32 {
    DEFAULT_IMAGE_SIZE
}

impl ProjectConfig {
    /// Read a project file, resolving relative directories against its location
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_path(path, "read config")?;
        let mut config = Self::from_toml_str(&text, path)?;

        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.asset_root = base.join(&config.asset_root);
            config.output_root = base.join(&config.output_root);
        }

        Ok(config)
    }

    /// Parse project file text; `origin` is only used in error messages
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid project file
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| GeneratorError::Config {
            path: origin.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Compile every pattern and table once
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute order is empty, a pattern is
    /// invalid, or a weight is negative
    pub fn compile(&self) -> Result<Project> {
        if self.attribute_order.is_empty() {
            return Err(invalid_parameter(
                "attribute_order",
                &"[]",
                &"at least one attribute must be picked",
            ));
        }
        if self.image_size == 0 {
            return Err(invalid_parameter(
                "image_size",
                &self.image_size,
                &"must be positive",
            ));
        }

        let generation = GenerationRules {
            attribute_order: self.attribute_order.clone(),
            optional_attributes: self.optional_attributes.iter().cloned().collect(),
            probabilities: ProbabilityTable::compile(&self.traits)?,
            must_pair: RuleSet::compile(&self.must_pair)?,
            must_not_pair: RuleSet::compile(&self.must_not_pair)?,
        };

        let layer_order = if self.layer_order.is_empty() {
            self.attribute_order.clone()
        } else {
            self.layer_order.clone()
        };

        let layers = LayerPlan {
            layer_order,
            asset_root: self.asset_root.clone(),
            rules: LayerRules::compile(&self.layer_rules)?,
            blending: BlendRules::compile(&self.blend_rules)?,
        };

        Ok(Project {
            generation,
            layers,
            asset_root: self.asset_root.clone(),
            output_root: self.output_root.clone(),
            summary_optional_attributes: self.summary_optional_attributes.clone(),
            shuffle_pool: self.shuffle_pool,
            image_size: self.image_size,
            final_metadata: self.final_metadata.clone(),
            duplicates: self.duplicates.clone(),
        })
    }
}

/// Compiled, read-only project shared by every command
#[derive(Debug)]
pub struct Project {
    /// Generation rules
    pub generation: GenerationRules,
    /// Layer resolution rules
    pub layers: LayerPlan,
    /// Asset directory
    pub asset_root: PathBuf,
    /// Output directory
    pub output_root: PathBuf,
    /// Attributes counted for the trait-count summary
    pub summary_optional_attributes: Vec<String>,
    /// Shuffle the pool before generating
    pub shuffle_pool: bool,
    /// Edge length of rendered images
    pub image_size: u32,
    /// Public metadata transform
    pub final_metadata: FinalMetadataConfig,
    /// Duplicate detection settings
    pub duplicates: DuplicateConfig,
}

impl Project {
    /// Load and compile a project file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or compiled
    pub fn load(path: &Path) -> Result<Self> {
        ProjectConfig::load(path)?.compile()
    }

    /// Discover assets and assemble the trait pool
    ///
    /// # Errors
    ///
    /// Returns an error if the asset directory cannot be read or a picked
    /// trait matches more than one probability pattern
    pub fn load_pool(&self) -> Result<TraitPool> {
        let assets = discover_assets(&self.asset_root)?;
        self.pool_from_assets(&assets)
    }

    /// Assemble the trait pool from already discovered canonical names
    ///
    /// # Errors
    ///
    /// Returns an error if a pool entry, including a synthesized `None`,
    /// matches more than one probability pattern
    pub fn pool_from_assets<S: AsRef<str>>(&self, assets: &[S]) -> Result<TraitPool> {
        let picked: HashSet<&str> = self
            .generation
            .attribute_order
            .iter()
            .map(String::as_str)
            .collect();
        let relevant: Vec<&str> = assets
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| picked.contains(attribute_of(name)))
            .collect();

        let pool = TraitPool::from_assets(
            &relevant,
            &self.generation.optional_attributes,
            &self.generation.probabilities,
        );
        // Synthetic None entries are weighted like any other pool trait
        self.generation
            .probabilities
            .ensure_unambiguous(pool.entries())?;
        info!(traits = pool.len(), "loaded trait pool");
        Ok(pool)
    }
}
