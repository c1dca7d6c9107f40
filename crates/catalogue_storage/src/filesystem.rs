//! Filesystem-based media storage implementation.

use crate::{MediaMetadata, MediaStorage};
use catalogue_core::{BlobReference, MediaVariant};
use catalogue_error::{CatalogueResult, StorageError, StorageErrorKind};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const BACKEND: &str = "filesystem";

/// Filesystem storage backend.
///
/// Stores one directory per item, keyed by its external reference:
/// `{base_path}/{ref[0:2]}/{ref[2:4]}/{ref}/{file_name}`
///
/// ```text
/// /var/catalogue/media/
/// ├── 3f/
/// │   └── 9a/
/// │       └── 3f9a0c1e-.../
/// │           ├── front.jpg
/// │           └── conversions/        (thumb/preview, written by an image worker)
/// └── b2/
///     └── ...
/// ```
///
/// Writes go to a temp file first and are renamed into place.
/// Variant URLs follow the same layout under `public_base_url`; conversions
/// are expected at `conversions/{stem}-{variant}.{ext}`.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
    public_base_url: Option<String>,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> CatalogueResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self {
            base_path,
            public_base_url: None,
        })
    }

    /// Serve variant URLs under this base.
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Root directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Compute SHA-256 hash of data.
    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    /// Relative key for an item's file.
    fn storage_key(metadata: &MediaMetadata) -> String {
        let reference = metadata.external_ref.to_string();
        format!(
            "{}/{}/{}/{}",
            &reference[0..2],
            &reference[2..4],
            reference,
            safe_file_name(&metadata.file_name)
        )
    }

    /// Resolve a relative key, refusing anything that escapes the base.
    fn resolve(&self, key: &str) -> CatalogueResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative.components().any(|c| {
            !matches!(c, std::path::Component::Normal(_))
        });
        if escapes || key.is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(key.to_string())).into());
        }
        Ok(self.base_path.join(relative))
    }

    /// Verify content hash matches expected hash.
    fn verify_hash(data: &[u8], expected_hash: &str) -> CatalogueResult<()> {
        let actual_hash = Self::compute_hash(data);
        if actual_hash != expected_hash {
            return Err(StorageError::new(StorageErrorKind::HashMismatch {
                expected: expected_hash.to_string(),
                actual: actual_hash,
            })
            .into());
        }
        Ok(())
    }
}

/// Keep only the final path component of a client-supplied name.
fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "..")
        .unwrap_or("file")
        .to_string()
}

/// `a/b/front.jpg` + thumb -> `a/b/conversions/front-thumb.jpg`
fn conversion_key(key: &str, variant: MediaVariant) -> String {
    let path = Path::new(key);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str());
    let file = match ext {
        Some(ext) => format!("{}-{}.{}", stem, variant, ext),
        None => format!("{}-{}", stem, variant),
    };
    match key.rsplit_once('/') {
        Some((dir, _)) => format!("{}/conversions/{}", dir, file),
        None => format!("conversions/{}", file),
    }
}

#[async_trait::async_trait]
impl MediaStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, data, metadata), fields(size = data.len(), external_ref = %metadata.external_ref))]
    async fn store(
        &self,
        data: &[u8],
        metadata: &MediaMetadata,
    ) -> CatalogueResult<BlobReference> {
        let hash = Self::compute_hash(data);
        let key = Self::storage_key(metadata);
        let path = self.resolve(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(
            hash = %hash,
            path = %path.display(),
            size = data.len(),
            mime_type = %metadata.mime_type,
            "Stored media file"
        );

        Ok(BlobReference {
            storage_backend: BACKEND.to_string(),
            storage_path: key,
            content_hash: hash,
        })
    }

    #[tracing::instrument(skip(self, reference), fields(path = %reference.storage_path))]
    async fn retrieve(&self, reference: &BlobReference) -> CatalogueResult<Vec<u8>> {
        let path = self.resolve(&reference.storage_path)?;

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(reference.storage_path.clone()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        Self::verify_hash(&data, &reference.content_hash)?;

        tracing::debug!(path = %path.display(), size = data.len(), "Retrieved media file");
        Ok(data)
    }

    fn url(&self, reference: &BlobReference, variant: MediaVariant) -> Option<String> {
        let base = self.public_base_url.as_ref()?;
        let key = match variant {
            MediaVariant::Original => reference.storage_path.clone(),
            other => conversion_key(&reference.storage_path, other),
        };
        Some(format!("{}/{}", base, key))
    }

    #[tracing::instrument(skip(self, reference), fields(path = %reference.storage_path))]
    async fn delete(&self, reference: &BlobReference) -> CatalogueResult<()> {
        let path = self.resolve(&reference.storage_path)?;

        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(reference.storage_path.clone()))
            } else {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "delete {}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        // The item directory holds nothing but this file and its conversions.
        if let Some(item_dir) = path.parent() {
            if let Err(e) = tokio::fs::remove_dir_all(item_dir).await {
                tracing::debug!(dir = %item_dir.display(), error = %e, "Item directory not removed");
            }
        }

        tracing::info!(path = %path.display(), "Deleted media file");
        Ok(())
    }

    async fn exists(&self, reference: &BlobReference) -> CatalogueResult<bool> {
        let path = self.resolve(&reference.storage_path)?;
        Ok(tokio::fs::try_exists(path).await.unwrap_or(false))
    }
}
