//! Error types and context management for generation and compositing

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all generation, layering and I/O operations
#[derive(Debug)]
pub enum GeneratorError {
    /// No trait could be picked for a required attribute
    ///
    /// Occurs when the rule and probability tables leave a non-optional
    /// attribute without any weighted candidate for the partial attribute set.
    Unsatisfiable {
        /// Attribute being picked
        attribute: String,
        /// Candidates that survived constraint filtering
        candidates: Vec<String>,
        /// Draw threshold that was never reached
        threshold: f64,
        /// Cumulative weight reached while walking the candidates
        cumulative_weight: f64,
    },

    /// A trait matches more than one probability pattern
    AmbiguousProbability {
        /// Canonical trait name
        canonical_name: String,
        /// Every pattern that matched, in declaration order
        patterns: Vec<String>,
    },

    /// A probability weight is negative or not finite
    InvalidWeight {
        /// Pattern the weight was declared for
        pattern: String,
        /// Offending weight
        weight: f64,
    },

    /// A glob or regular expression failed to compile
    InvalidPattern {
        /// Pattern as written by the author
        pattern: String,
        /// Underlying regex compilation error
        source: regex::Error,
    },

    /// A layer mutation referenced an attribute with no layer in the set
    MissingAnchor {
        /// Attribute used as the anchor
        attribute: String,
        /// Mutation that was attempted
        operation: &'static str,
    },

    /// A layer mutation referenced a layer that is not in the set
    UnknownLayer {
        /// Canonical name of the missing layer
        canonical_name: String,
    },

    /// A layer was asked to move relative to its own attribute with no other
    /// layer of that attribute to anchor on
    SelfReferentialMove {
        /// Canonical name of the layer being moved
        canonical_name: String,
        /// Anchor attribute of the move
        attribute: String,
    },

    /// Project configuration file could not be parsed
    Config {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying TOML error
        source: Box<toml::de::Error>,
    },

    /// Metadata record could not be encoded or decoded
    Metadata {
        /// Path of the record
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Failed to load a layer image from filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a rendered image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Asset validation reported one or more problems
    AssetValidation {
        /// Human readable problem list
        problems: Vec<String>,
    },

    /// A duplicate token kept colliding after every regeneration attempt
    DuplicateExhausted {
        /// Token being regenerated
        token_id: usize,
        /// Attempts made
        attempts: usize,
    },
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsatisfiable {
                attribute,
                candidates,
                threshold,
                cumulative_weight,
            } => {
                write!(
                    f,
                    "Unable to pick trait for attribute '{attribute}' (candidates: [{}], threshold {threshold}, cumulative weight {cumulative_weight})",
                    candidates.join(", ")
                )
            }
            Self::AmbiguousProbability {
                canonical_name,
                patterns,
            } => {
                write!(
                    f,
                    "Trait '{canonical_name}' matches multiple probability patterns: {}",
                    patterns.join(", ")
                )
            }
            Self::InvalidWeight { pattern, weight } => {
                write!(
                    f,
                    "Weight {weight} for pattern '{pattern}' must be finite and non-negative"
                )
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid pattern '{pattern}': {source}")
            }
            Self::MissingAnchor {
                attribute,
                operation,
            } => {
                write!(f, "No layer with attribute '{attribute}' for {operation}")
            }
            Self::UnknownLayer { canonical_name } => {
                write!(f, "Layer '{canonical_name}' is not part of the layer set")
            }
            Self::SelfReferentialMove {
                canonical_name,
                attribute,
            } => {
                write!(
                    f,
                    "Cannot move layer '{canonical_name}' relative to its own attribute '{attribute}'"
                )
            }
            Self::Config { path, source } => {
                write!(f, "Failed to parse config '{}': {source}", path.display())
            }
            Self::Metadata { path, source } => {
                write!(f, "Invalid metadata '{}': {source}", path.display())
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::AssetValidation { problems } => {
                write!(
                    f,
                    "Asset validation failed with {} problem(s):\n  {}",
                    problems.len(),
                    problems.join("\n  ")
                )
            }
            Self::DuplicateExhausted { token_id, attempts } => {
                write!(
                    f,
                    "Token {token_id} is still a duplicate after {attempts} regeneration attempts"
                )
            }
        }
    }
}

impl std::error::Error for GeneratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            Self::Config { source, .. } => Some(source.as_ref()),
            Self::Metadata { source, .. } => Some(source),
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for generator results
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Attaches a path and operation to raw I/O failures
pub trait WithPath<T> {
    /// Convert an I/O error into a [`GeneratorError::FileSystem`]
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path and operation applied
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T>;
}

impl<T> WithPath<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T> {
        self.map_err(|source| GeneratorError::FileSystem {
            path: path.to_path_buf(),
            operation,
            source,
        })
    }
}

impl From<std::io::Error> for GeneratorError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> GeneratorError {
    GeneratorError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an error for a malformed path or record name
pub fn io_error(msg: &str) -> GeneratorError {
    GeneratorError::InvalidParameter {
        parameter: "path",
        value: String::new(),
        reason: msg.to_string(),
    }
}
