//! Catalogue CLI binary.
//!
//! Command-line access to media collections:
//! - List, upload and fetch images
//! - Edit text, move the cover, delete and reorder items
//! - Check and repair persisted collections

use catalogue::{CatalogueConfig, LoggingConfig, init_logging};
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, handle_command};

    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let logging = if cli.verbose {
        LoggingConfig::new("debug")
    } else {
        LoggingConfig::default()
    };
    init_logging(&logging.with_json_logs(cli.json_logs))?;

    let config = match &cli.config {
        Some(path) => CatalogueConfig::from_file(path)?,
        None => CatalogueConfig::load()?,
    };
    tracing::debug!(storage = %config.storage().path().display(), "Configuration loaded");

    handle_command(cli.command, config, cli.format).await?;

    Ok(())
}
