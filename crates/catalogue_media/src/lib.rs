//! Ordered media collections for catalogue entities.
//!
//! Each category or product owns named collections of images. A collection
//! keeps two invariants after every mutation:
//!
//! - positions form the dense range `0..n`
//! - a non-empty collection has exactly one cover item
//!
//! [`MediaStore`] is the entry point. It ingests local files and remote URLs
//! (one failure never aborts a batch), edits per-locale text, moves the cover,
//! deletes and reorders items, and serializes mutations per collection.
//! [`OrderingEngine`] and [`CoverInvariantEnforcer`] hold the pure rules.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cover;
mod file_repository;
mod ingest;
mod ordering;
mod report;
mod repository;
mod store;

pub use config::{CatalogueConfig, LocaleConfig, MediaConfig, StorageConfig};
pub use cover::CoverInvariantEnforcer;
pub use file_repository::JsonFileMediaRepository;
pub use ingest::{
    FetchedContent, HttpFetcher, IngestedContent, Ingestor, RemoteFetcher, parse_url,
    parse_url_list,
};
pub use ordering::OrderingEngine;
pub use report::{ItemFailure, Operation, OperationReport};
pub use repository::{InMemoryMediaRepository, MediaRepository};
pub use store::MediaStore;
