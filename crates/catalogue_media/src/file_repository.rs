//! JSON-file repository: one file per collection.
//!
//! ```text
//! {root}/
//! ├── sequence.json                          (last issued item id)
//! ├── shop__product-42__images__<digest>.json
//! └── shop__category-7__images__<digest>.json
//! ```

use crate::MediaRepository;
use async_trait::async_trait;
use catalogue_core::{CollectionScope, MediaItem, MediaItemId};
use catalogue_error::{CatalogueResult, RepositoryError, RepositoryErrorKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// On-disk shape of one collection.
#[derive(Debug, Serialize, Deserialize)]
struct CollectionRecord {
    scope: CollectionScope,
    items: Vec<MediaItem>,
}

/// Repository persisting each collection as a JSON document.
#[derive(Debug)]
pub struct JsonFileMediaRepository {
    root: PathBuf,
    sequence: Mutex<()>,
}

impl JsonFileMediaRepository {
    /// Open (and create if needed) a repository rooted at `root`.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> CatalogueResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            RepositoryError::new(RepositoryErrorKind::Io(format!(
                "{}: {}",
                root.display(),
                e
            )))
        })?;
        tracing::info!(path = %root.display(), "Opened collection records");
        Ok(Self {
            root,
            sequence: Mutex::new(()),
        })
    }

    fn collection_path(&self, scope: &CollectionScope) -> PathBuf {
        self.root.join(format!("{}.json", scope.storage_key()))
    }

    fn sequence_path(&self) -> PathBuf {
        self.root.join("sequence.json")
    }

    async fn read_optional(path: &Path) -> CatalogueResult<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepositoryError::from(e).into()),
        }
    }

    /// Write to a temp file, then rename into place.
    async fn write_atomic(path: &Path, bytes: &[u8]) -> CatalogueResult<()> {
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, bytes)
            .await
            .map_err(RepositoryError::from)?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(RepositoryError::from)?;
        Ok(())
    }
}

#[async_trait]
impl MediaRepository for JsonFileMediaRepository {
    #[tracing::instrument(skip(self), fields(scope = %scope))]
    async fn load(&self, scope: &CollectionScope) -> CatalogueResult<Vec<MediaItem>> {
        let path = self.collection_path(scope);
        let Some(bytes) = Self::read_optional(&path).await? else {
            return Ok(Vec::new());
        };
        let record: CollectionRecord =
            serde_json::from_slice(&bytes).map_err(RepositoryError::from)?;
        if record.scope != *scope {
            tracing::error!(found = %record.scope, path = %path.display(), "Record scope mismatch");
            return Err(RepositoryError::new(RepositoryErrorKind::ScopeMismatch {
                expected: scope.to_string(),
                found: record.scope.to_string(),
            })
            .into());
        }
        tracing::debug!(count = record.items.len(), "Loaded collection");
        Ok(record.items)
    }

    #[tracing::instrument(skip(self, items), fields(scope = %scope, count = items.len()))]
    async fn save(&self, scope: &CollectionScope, items: &[MediaItem]) -> CatalogueResult<()> {
        let path = self.collection_path(scope);
        if items.is_empty() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(RepositoryError::from(e).into()),
            }
            return Ok(());
        }

        let record = CollectionRecord {
            scope: scope.clone(),
            items: items.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&record).map_err(RepositoryError::from)?;
        Self::write_atomic(&path, &bytes).await
    }

    async fn next_id(&self) -> CatalogueResult<MediaItemId> {
        let _guard = self.sequence.lock().await;
        let path = self.sequence_path();
        let last: u64 = match Self::read_optional(&path).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(RepositoryError::from)?,
            None => 0,
        };
        let next = last + 1;
        let bytes = serde_json::to_vec(&next).map_err(RepositoryError::from)?;
        Self::write_atomic(&path, &bytes).await?;
        Ok(MediaItemId::from(next))
    }

    #[tracing::instrument(skip(self), fields(scope = %scope))]
    async fn delete_collection(&self, scope: &CollectionScope) -> CatalogueResult<Vec<MediaItem>> {
        let items = self.load(scope).await?;
        self.save(scope, &[]).await?;
        Ok(items)
    }
}
