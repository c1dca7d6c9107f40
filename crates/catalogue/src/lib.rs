//! Catalogue media collections.
//!
//! Categories and products each own named collections of images. A
//! collection keeps its items in a dense zero-based order and has exactly one
//! cover image whenever it is non-empty. Images arrive from local uploads or
//! remote URLs; a failed source is reported and the rest of the batch goes on.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use catalogue::{CatalogueConfig, CollectionScope, Owner, open_store};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = open_store(CatalogueConfig::load()?)?;
//!     let scope = CollectionScope::new("shop", Owner::product(42), "images");
//!
//!     let report = store.upload_urls(&scope, "https://example.com/front.jpg").await?;
//!     for line in report.summary() {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `catalogue_error` - Error types
//! - `catalogue_core` - Scopes, identifiers, items and views
//! - `catalogue_storage` - Binary content storage
//! - `catalogue_media` - Ordering, cover rule, ingestion and the `MediaStore` service
//!
//! This crate (`catalogue`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use catalogue_core::*;
pub use catalogue_error::*;
pub use catalogue_media::*;
pub use catalogue_storage::*;

mod observability;

pub use observability::{LoggingConfig, init_logging};

use std::sync::Arc;

/// Open a store persisting records as JSON files and content on disk,
/// both under `config.storage().path()`.
///
/// # Errors
///
/// Returns an error if the storage directories cannot be created or the
/// HTTP client cannot be built.
pub fn open_store(config: CatalogueConfig) -> CatalogueResult<MediaStore> {
    let mut storage = FileSystemStorage::new(config.storage().media_dir())?;
    if let Some(base_url) = config.storage().public_base_url() {
        storage = storage.with_public_base_url(base_url.as_str());
    }
    let repository = JsonFileMediaRepository::new(config.storage().records_dir())?;
    MediaStore::new(config, Arc::new(repository), Arc::new(storage))
}
