//! Persistence of media item records.
//!
//! Repositories persist whole collections: the media service reads a
//! collection, mutates it in memory under the collection lock, and writes it
//! back in one call, so a rejected operation never leaves partial changes.

use async_trait::async_trait;
use catalogue_core::{CollectionScope, MediaItem, MediaItemId};
use catalogue_error::CatalogueResult;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage of media item records, one collection at a time.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// All items of a collection, in no particular order. Unknown scopes are empty.
    async fn load(&self, scope: &CollectionScope) -> CatalogueResult<Vec<MediaItem>>;

    /// Replace the stored collection with `items`.
    async fn save(&self, scope: &CollectionScope, items: &[MediaItem]) -> CatalogueResult<()>;

    /// Allocate a fresh persisted identifier.
    async fn next_id(&self) -> CatalogueResult<MediaItemId>;

    /// Drop a collection and return the items it held.
    async fn delete_collection(&self, scope: &CollectionScope) -> CatalogueResult<Vec<MediaItem>>;
}

/// In-memory repository.
///
/// Stores collections in a HashMap protected by an RwLock for thread-safe access.
/// All data is lost when the repository is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryMediaRepository {
    collections: Arc<RwLock<HashMap<CollectionScope, Vec<MediaItem>>>>,
    next_id: Arc<RwLock<u64>>,
}

impl InMemoryMediaRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(RwLock::new(1)),
        }
    }

    /// Number of non-empty collections (for testing).
    pub async fn len(&self) -> usize {
        self.collections.read().await.len()
    }

    /// Check if the repository is empty (for testing).
    pub async fn is_empty(&self) -> bool {
        self.collections.read().await.is_empty()
    }
}

impl Default for InMemoryMediaRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn load(&self, scope: &CollectionScope) -> CatalogueResult<Vec<MediaItem>> {
        Ok(self
            .collections
            .read()
            .await
            .get(scope)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, scope: &CollectionScope, items: &[MediaItem]) -> CatalogueResult<()> {
        let mut collections = self.collections.write().await;
        if items.is_empty() {
            collections.remove(scope);
        } else {
            collections.insert(scope.clone(), items.to_vec());
        }
        Ok(())
    }

    async fn next_id(&self) -> CatalogueResult<MediaItemId> {
        let mut next_id = self.next_id.write().await;
        let id = *next_id;
        *next_id += 1;
        Ok(MediaItemId::from(id))
    }

    async fn delete_collection(&self, scope: &CollectionScope) -> CatalogueResult<Vec<MediaItem>> {
        Ok(self
            .collections
            .write()
            .await
            .remove(scope)
            .unwrap_or_default())
    }
}
