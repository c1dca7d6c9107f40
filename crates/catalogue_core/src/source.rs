//! Ingestion sources.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a new media item's bytes come from.
///
/// The source is consumed once at creation and not kept afterwards.
///
/// # Examples
///
/// ```
/// use catalogue_core::MediaSource;
///
/// let upload = MediaSource::local("/tmp/livewire-tmp/abc123", Some("front.jpg"));
/// let remote = MediaSource::remote("https://example.com/image.png");
/// assert_eq!(remote.locator(), "https://example.com/image.png");
/// assert_eq!(upload.locator(), "front.jpg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaSource {
    /// A temporary file on local disk
    LocalFile {
        /// Path to the temporary file
        path: PathBuf,
        /// File name as the client supplied it
        file_name: Option<String>,
    },
    /// A remote URL to fetch
    RemoteUrl {
        /// The URL, unvalidated
        url: String,
    },
}

impl MediaSource {
    /// Local file source.
    pub fn local(path: impl Into<PathBuf>, file_name: Option<&str>) -> Self {
        MediaSource::LocalFile {
            path: path.into(),
            file_name: file_name.map(str::to_string),
        }
    }

    /// Remote URL source.
    pub fn remote(url: impl Into<String>) -> Self {
        MediaSource::RemoteUrl { url: url.into() }
    }

    /// Human-facing label used in failure reports.
    pub fn locator(&self) -> String {
        match self {
            MediaSource::LocalFile { path, file_name } => file_name
                .clone()
                .unwrap_or_else(|| path.display().to_string()),
            MediaSource::RemoteUrl { url } => url.clone(),
        }
    }
}
