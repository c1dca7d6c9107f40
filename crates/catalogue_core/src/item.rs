//! The persisted media item record.

use crate::{ExternalRef, LocalizedText, MediaItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location of an item's bytes in a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobReference {
    /// Storage backend name (e.g., "filesystem")
    pub storage_backend: String,
    /// Backend-specific path/key
    pub storage_path: String,
    /// SHA-256 of the content, checked on retrieval
    pub content_hash: String,
}

/// One image in an ordered, cover-tagged collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Persisted identifier
    pub id: MediaItemId,
    /// Client-visible identifier
    pub external_ref: ExternalRef,
    /// Display name per locale
    #[serde(default)]
    pub name: LocalizedText,
    /// Description per locale
    #[serde(default)]
    pub description: LocalizedText,
    /// Whether this is the collection's cover
    #[serde(default)]
    pub is_cover: bool,
    /// Zero-based display position
    #[serde(default)]
    pub position: u32,
    /// File name captured at ingestion
    pub file_name: String,
    /// MIME type captured at ingestion
    pub mime_type: String,
    /// Size in bytes captured at ingestion
    pub byte_size: u64,
    /// Where the bytes live
    pub blob: BlobReference,
    /// Ingestion time
    pub created_at: DateTime<Utc>,
}

impl MediaItem {
    /// Name for a locale, falling back to the default locale, then the file name.
    pub fn display_name<'a>(&'a self, locale: &str, default_locale: &str) -> &'a str {
        self.name
            .resolve(locale, default_locale)
            .unwrap_or(&self.file_name)
    }

    /// Description for a locale, falling back to the default locale, then empty.
    pub fn display_description<'a>(&'a self, locale: &str, default_locale: &str) -> &'a str {
        self.description
            .resolve(locale, default_locale)
            .unwrap_or_default()
    }
}
