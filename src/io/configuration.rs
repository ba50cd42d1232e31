//! Runtime constants and file layout defaults

/// Project file looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "traitweave.toml";

/// Directory scanned for layer assets
pub const DEFAULT_ASSET_ROOT: &str = "assets";
/// Directory receiving every generated artifact
pub const DEFAULT_OUTPUT_ROOT: &str = "output";

/// Subdirectory for internal metadata (input to compositing)
pub const INTERNAL_DIR: &str = "internal";
/// Subdirectory for public metadata
pub const FINAL_DIR: &str = "json";
/// Subdirectory for rendered images
pub const IMAGES_DIR: &str = "images";

/// Append-only log of every seed used for generation
pub const SEED_HISTORY_FILE: &str = "seed-history.txt";
/// Seed value that reuses the most recent entry of the seed history
pub const LAST_SEED_KEYWORD: &str = "last";

/// Per-attribute trait counts
pub const ATTRIBUTE_COUNTS_FILE: &str = "attribute-counts.json";
/// Attribute to trait to token id index
pub const TOKEN_INDEX_FILE: &str = "attribute-token-index.json";
/// Tokens grouped by number of optional traits present
pub const TRAIT_COUNTS_FILE: &str = "trait-counts.json";

/// Trait name assigned when an optional attribute has no trait
pub const NONE_TRAIT: &str = "None";
/// Extension of every layer asset
pub const ASSET_EXTENSION: &str = "png";

/// Default edge length of rendered images in pixels
pub const DEFAULT_IMAGE_SIZE: u32 = 2400;

/// Upper bound for regeneration attempts of a single duplicate token
pub const MAX_DEDUPE_ATTEMPTS: usize = 10_000;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Environment variable holding the log filter
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
/// Log filter used when the environment does not provide one
pub const DEFAULT_LOG_LEVEL: &str = "info";
