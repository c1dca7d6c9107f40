//! View-friendly projections of media items.

use crate::{ExternalRef, LocalizedText, MediaItem, MediaItemId};
use serde::{Deserialize, Serialize};

/// Rendition of an item that a URL can point at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaVariant {
    /// The ingested file
    #[display("original")]
    Original,
    /// Small grid thumbnail
    #[display("thumb")]
    Thumb,
    /// Larger preview for dialogs
    #[display("preview")]
    Preview,
}

/// Public URLs of an item's variants, when the backend can serve them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaUrls {
    /// Original file
    pub url: Option<String>,
    /// Thumbnail
    pub thumb_url: Option<String>,
    /// Preview
    pub preview_url: Option<String>,
}

/// What the admin UI renders for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItemView {
    /// Persisted identifier
    pub id: MediaItemId,
    /// Client-visible identifier
    pub uuid: ExternalRef,
    /// Variant URLs
    #[serde(flatten)]
    pub urls: MediaUrls,
    /// All name translations
    pub name: LocalizedText,
    /// All description translations
    pub description: LocalizedText,
    /// Name resolved for the requested locale
    pub display_name: String,
    /// Description resolved for the requested locale, empty when none
    pub display_description: String,
    /// Cover flag
    pub is_cover: bool,
    /// Display position
    pub position: u32,
    /// File name
    pub file_name: String,
    /// MIME type
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
}

impl MediaItemView {
    /// Project an item for display in `locale`.
    pub fn project(item: &MediaItem, urls: MediaUrls, locale: &str, default_locale: &str) -> Self {
        Self {
            id: item.id,
            uuid: item.external_ref,
            urls,
            name: item.name.clone(),
            description: item.description.clone(),
            display_name: item.display_name(locale, default_locale).to_string(),
            display_description: item.display_description(locale, default_locale).to_string(),
            is_cover: item.is_cover,
            position: item.position,
            file_name: item.file_name.clone(),
            mime_type: item.mime_type.clone(),
            size: item.byte_size,
        }
    }
}
