//! CLI command definitions.

use catalogue::{CollectionScope, ExternalRef, Owner};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Catalogue - ordered media collections for categories and products
#[derive(Parser, Debug)]
#[command(name = "catalogue")]
#[command(about = "Manage ordered, cover-tagged image collections of catalogue entities", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (defaults to bundled, home and ./catalogue.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,
}

/// Which collection a command acts on.
#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    /// Tenant/site identifier
    #[arg(long, default_value = "default")]
    pub site: String,

    /// Owning entity, as product:<id> or category:<id>
    #[arg(long)]
    pub owner: Owner,

    /// Collection name (defaults to media.collection)
    #[arg(long)]
    pub collection: Option<String>,
}

impl ScopeArgs {
    /// Resolve into a scope, filling in the configured collection name.
    pub fn scope(&self, default_collection: &str) -> CollectionScope {
        CollectionScope::new(
            self.site.as_str(),
            self.owner,
            self.collection
                .clone()
                .unwrap_or_else(|| default_collection.to_string()),
        )
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List a collection in display order
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Locale for names (defaults to locales.default)
        #[arg(long)]
        locale: Option<String>,
    },

    /// Upload local image files
    Upload {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Add images from URLs (arguments, --file, or newline-delimited stdin)
    AddUrls {
        #[command(flatten)]
        scope: ScopeArgs,

        /// File with one URL per line
        #[arg(long)]
        file: Option<PathBuf>,

        /// URLs to fetch
        urls: Vec<String>,
    },

    /// Edit an item's name or description for one locale
    Edit {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Item identifier
        item: ExternalRef,

        /// Locale of the text (defaults to locales.default)
        #[arg(long)]
        locale: Option<String>,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Make an item the cover
    SetCover {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Item identifier
        item: ExternalRef,
    },

    /// Delete an item
    Delete {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Item identifier
        item: ExternalRef,
    },

    /// Apply a complete new order
    Reorder {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Every item identifier, in the new order
        #[arg(required = true)]
        items: Vec<ExternalRef>,
    },

    /// Move one item from one display index to another
    Move {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Current index
        from: usize,

        /// Target index
        to: usize,
    },

    /// Detect and repair ordering and cover faults
    Check {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Delete a whole collection, as when its owner is deleted
    Purge {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// List configured locales
    Locales,
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
