//! Storage trait definition.

use catalogue_core::{BlobReference, ExternalRef, MediaVariant};
use catalogue_error::CatalogueResult;

/// Metadata about content being stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    /// Item the content belongs to; keys the storage location
    pub external_ref: ExternalRef,
    /// File name to store under
    pub file_name: String,
    /// MIME type (e.g., "image/png")
    pub mime_type: String,
}

/// Trait for pluggable media storage backends.
///
/// Implementations handle the actual storage and retrieval of binary media data,
/// while item records are managed separately in a repository.
#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store content and return a reference.
    ///
    /// The implementation should:
    /// - Compute a content hash for integrity checks
    /// - Store the binary data in its backend
    /// - Return a reference that can be used to retrieve the data
    async fn store(&self, data: &[u8], metadata: &MediaMetadata)
    -> CatalogueResult<BlobReference>;

    /// Retrieve content by reference, verifying its hash.
    async fn retrieve(&self, reference: &BlobReference) -> CatalogueResult<Vec<u8>>;

    /// Public URL of a variant, if the backend can serve one.
    fn url(&self, reference: &BlobReference, variant: MediaVariant) -> Option<String>;

    /// Delete content by reference.
    async fn delete(&self, reference: &BlobReference) -> CatalogueResult<()>;

    /// Check if content exists.
    async fn exists(&self, reference: &BlobReference) -> CatalogueResult<bool>;
}
