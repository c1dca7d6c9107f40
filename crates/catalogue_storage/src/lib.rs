//! Binary content storage for catalogue media.
//!
//! Media item records (names, order, cover flag) live in a repository; the
//! bytes live behind the [`MediaStorage`] trait so the backend can be swapped
//! without touching the ordering and cover logic.
//!
//! # Example
//!
//! ```rust
//! use catalogue_core::{ExternalRef, MediaVariant};
//! use catalogue_storage::{FileSystemStorage, MediaMetadata, MediaStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/catalogue-media")?
//!     .with_public_base_url("https://cdn.example.com/media");
//! let metadata = MediaMetadata {
//!     external_ref: ExternalRef::generate(),
//!     file_name: "front.png".to_string(),
//!     mime_type: "image/png".to_string(),
//! };
//!
//! let reference = storage.store(&[0u8; 1024], &metadata).await?;
//! let url = storage.url(&reference, MediaVariant::Original);
//! assert!(url.is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod storage;

pub use catalogue_core::BlobReference;
pub use filesystem::FileSystemStorage;
pub use storage::{MediaMetadata, MediaStorage};
