/// Asset discovery and validation
pub mod assets;
/// Command-line interface and subcommand dispatch
pub mod cli;
/// Runtime constants and file layout defaults
pub mod configuration;
/// Error types and path context
pub mod error;
/// Layer compositing and PNG export
pub mod image;
/// Metadata records, output layout and seed history
pub mod metadata;
/// Progress bars for token batches
pub mod progress;
/// Project file parsing and compilation
pub mod project;
