//! CLI entry point for generating and compositing token collections

use clap::Parser;
use traitweave::io::cli::{Cli, CommandProcessor};
use traitweave::io::configuration::{DEFAULT_LOG_LEVEL, LOG_LEVEL_ENV};
use tracing_subscriber::EnvFilter;

fn main() -> traitweave::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let processor = CommandProcessor::new(cli);
    processor.process()
}
