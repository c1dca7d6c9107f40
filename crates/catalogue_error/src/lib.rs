//! Error types for the catalogue media subsystem.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! The four error families a caller of the media subsystem sees are
//! [`IngestionError`] (recovered per item during batch uploads),
//! [`OrderingError`] (a reorder was rejected as a whole),
//! [`NotFoundError`] (an identifier did not resolve) and
//! [`ConsistencyFault`] (persisted state broke an invariant and was repaired).
//!
//! # Examples
//!
//! ```
//! use catalogue_error::{CatalogueResult, IngestionError, IngestionErrorKind};
//!
//! fn fetch() -> CatalogueResult<Vec<u8>> {
//!     Err(IngestionError::new(IngestionErrorKind::InvalidUrl("not-a-url".into())))?
//! }
//!
//! assert!(fetch().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod consistency;
mod error;
mod ingestion;
mod not_found;
mod ordering;
mod repository;
mod storage;

pub use config::ConfigError;
pub use consistency::{ConsistencyFault, ConsistencyFaultKind};
pub use error::{CatalogueError, CatalogueErrorKind, CatalogueResult};
pub use ingestion::{IngestionError, IngestionErrorKind};
pub use not_found::NotFoundError;
pub use ordering::{OrderingError, OrderingErrorKind};
pub use repository::{RepositoryError, RepositoryErrorKind};
pub use storage::{StorageError, StorageErrorKind};
