//! Token metadata records and the output directory layout

use crate::generation::attributes::AttributeSet;
use crate::io::configuration::{
    FINAL_DIR, IMAGES_DIR, INTERNAL_DIR, NONE_TRAIT, SEED_HISTORY_FILE,
};
use crate::io::error::{GeneratorError, Result, WithPath};
use crate::io::project::FinalMetadataConfig;
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One `trait_type` / `value` pair of a metadata record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftAttribute {
    /// Attribute name
    pub trait_type: String,
    /// Trait name
    pub value: String,
}

/// Marketplace-style metadata record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    /// Attributes in pick order
    pub attributes: Vec<NftAttribute>,
}

impl NftMetadata {
    /// Record for an attribute set, keeping its order
    pub fn from_attributes(attributes: &AttributeSet) -> Self {
        Self {
            attributes: attributes
                .iter()
                .map(|(trait_type, value)| NftAttribute {
                    trait_type: trait_type.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    /// Attribute set described by the record
    pub fn to_attributes(&self) -> AttributeSet {
        self.attributes
            .iter()
            .map(|a| (a.trait_type.as_str(), a.value.as_str()))
            .collect()
    }
}

/// Either shape a record may be stored in
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredRecord {
    /// `{ "attributes": [{ "trait_type", "value" }] }`
    Metadata(NftMetadata),
    /// Plain ordered `{ attribute: trait }` object
    Attributes(AttributeSet),
}

impl StoredRecord {
    /// Attribute set held by the record
    pub fn into_attributes(self) -> AttributeSet {
        match self {
            Self::Metadata(metadata) => metadata.to_attributes(),
            Self::Attributes(attributes) => attributes,
        }
    }
}

/// How generated records are written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Internal and public metadata records
    #[default]
    Metadata,
    /// Internal record only, as a plain object
    Attributes,
}

/// Which copy of a token's record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    /// Full record consumed by compositing and summaries
    Internal,
    /// Published record after the final transform
    Final,
}

/// Apply the public transform to an attribute set
pub fn final_attributes(attributes: &AttributeSet, config: &FinalMetadataConfig) -> AttributeSet {
    attributes
        .iter()
        .filter(|(attribute, _)| !config.hidden_attributes.iter().any(|h| h == attribute))
        .filter(|(_, trait_name)| !(config.drop_none && *trait_name == NONE_TRAIT))
        .collect()
}

/// Serialize any value as pretty JSON, creating parent directories
///
/// # Errors
///
/// Returns an error if encoding or writing fails
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|source| {
        GeneratorError::Metadata {
            path: path.to_path_buf(),
            source,
        }
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path(parent, "create directory")?;
    }
    fs::write(path, text).with_path(path, "write json")
}

/// Read and decode a JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_path(path, "read json")?;
    serde_json::from_str(&text).map_err(|source| GeneratorError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

/// Paths of every artifact below the output root
#[derive(Clone, Debug)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding records of the given kind
    pub fn record_dir(&self, kind: RecordKind) -> PathBuf {
        match kind {
            RecordKind::Internal => self.root.join(INTERNAL_DIR),
            RecordKind::Final => self.root.join(FINAL_DIR),
        }
    }

    /// `{root}/internal/{id}.json` or `{root}/json/{id}.json`
    pub fn record_path(&self, kind: RecordKind, token_id: usize) -> PathBuf {
        self.record_dir(kind).join(format!("{token_id}.json"))
    }

    /// `{root}/images/{id}.png`
    pub fn image_path(&self, token_id: usize) -> PathBuf {
        self.root.join(IMAGES_DIR).join(format!("{token_id}.png"))
    }

    /// File directly below the output root
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create the record directories
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created
    pub fn ensure_dirs(&self) -> Result<()> {
        for kind in [RecordKind::Internal, RecordKind::Final] {
            let dir = self.record_dir(kind);
            fs::create_dir_all(&dir).with_path(&dir, "create directory")?;
        }
        Ok(())
    }

    /// Write a freshly generated token in the requested format
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be written
    pub fn write_token(
        &self,
        token_id: usize,
        attributes: &AttributeSet,
        format: OutputFormat,
        final_config: &FinalMetadataConfig,
    ) -> Result<()> {
        let internal = self.record_path(RecordKind::Internal, token_id);
        match format {
            OutputFormat::Metadata => {
                write_json(&internal, &NftMetadata::from_attributes(attributes))?;
                self.write_final(token_id, attributes, final_config)
            }
            OutputFormat::Attributes => write_json(&internal, attributes),
        }
    }

    /// Write the public record of a token
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written
    pub fn write_final(
        &self,
        token_id: usize,
        attributes: &AttributeSet,
        final_config: &FinalMetadataConfig,
    ) -> Result<()> {
        let path = self.record_path(RecordKind::Final, token_id);
        let published = final_attributes(attributes, final_config);
        write_json(&path, &NftMetadata::from_attributes(&published))
    }

    /// Load one token's internal record
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or malformed
    pub fn load_token(&self, token_id: usize) -> Result<AttributeSet> {
        let path = self.record_path(RecordKind::Internal, token_id);
        Ok(read_json::<StoredRecord>(&path)?.into_attributes())
    }

    /// Load every internal record, sorted by numeric token id
    ///
    /// Files whose stem is not a token id are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a record cannot be read
    pub fn load_all(&self) -> Result<Vec<(usize, AttributeSet)>> {
        let dir = self.record_dir(RecordKind::Internal);
        let mut ids = Vec::new();

        for entry in fs::read_dir(&dir).with_path(&dir, "list records")? {
            let path = entry.with_path(&dir, "list records")?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<usize>().ok())
            {
                Some(id) => ids.push(id),
                None => warn!(path = %path.display(), "ignoring record without token id"),
            }
        }

        ids.sort_unstable();
        debug!(records = ids.len(), "loading records");
        ids.into_iter()
            .map(|id| Ok((id, self.load_token(id)?)))
            .collect()
    }

    /// Append a seed and the current local time to the seed history
    ///
    /// # Errors
    ///
    /// Returns an error if the history file cannot be written
    pub fn append_seed(&self, seed: &str) -> Result<()> {
        let path = self.file(SEED_HISTORY_FILE);
        fs::create_dir_all(&self.root).with_path(&self.root, "create directory")?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_path(&path, "open seed history")?;
        writeln!(file, "{seed}: {}", Local::now().to_rfc3339()).with_path(&path, "append seed")
    }

    /// Most recently recorded seed
    ///
    /// # Errors
    ///
    /// Returns an error if the history file exists but cannot be read
    pub fn last_seed(&self) -> Result<Option<String>> {
        let path = self.file(SEED_HISTORY_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).with_path(&path, "read seed history")?;
        Ok(text
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.split_once(": ").map_or(line, |(seed, _)| seed))
            .map(str::to_string))
    }
}
