//! The media service: CRUD over ordered, cover-tagged collections.
//!
//! Every mutation runs under its collection's lock as one read-modify-write
//! cycle: load, repair any persisted fault, apply, renumber positions,
//! enforce the cover rule, save.

use catalogue_core::{
    BlobReference, CollectionScope, CommitEntry, ExternalRef, ItemEdit, MediaItem, MediaItemView,
    MediaSource, MediaUrls, MediaVariant,
};
use catalogue_error::{
    CatalogueResult, ConsistencyFault, IngestionError, IngestionErrorKind, NotFoundError,
};
use catalogue_storage::{MediaMetadata, MediaStorage};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};

use crate::{
    CatalogueConfig, CoverInvariantEnforcer, HttpFetcher, Ingestor, MediaRepository, Operation,
    OperationReport, OrderingEngine, RemoteFetcher, parse_url_list,
};

/// Content that made it into storage but has no record yet.
struct StagedItem {
    external_ref: ExternalRef,
    file_name: String,
    mime_type: String,
    byte_size: u64,
    blob: BlobReference,
}

/// Ordered media collections with a single cover each.
///
/// # Example
///
/// ```no_run
/// use catalogue_core::{CollectionScope, Owner};
/// use catalogue_media::{CatalogueConfig, InMemoryMediaRepository, MediaStore};
/// use catalogue_storage::FileSystemStorage;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CatalogueConfig::load()?;
/// let storage = FileSystemStorage::new(config.storage().media_dir())?;
/// let store = MediaStore::new(
///     config,
///     Arc::new(InMemoryMediaRepository::new()),
///     Arc::new(storage),
/// )?;
///
/// let scope = CollectionScope::new("shop", Owner::product(42), "images");
/// let report = store
///     .upload_urls(&scope, "https://example.com/a.jpg\nhttps://example.com/b.png")
///     .await?;
/// for line in report.summary() {
///     println!("{}", line);
/// }
/// # Ok(())
/// # }
/// ```
pub struct MediaStore {
    repository: Arc<dyn MediaRepository>,
    storage: Arc<dyn MediaStorage>,
    ingestor: Ingestor,
    config: CatalogueConfig,
    locks: Mutex<HashMap<CollectionScope, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for MediaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStore")
            .field("config", &self.config)
            .field("ingestor", &self.ingestor)
            .finish_non_exhaustive()
    }
}

impl MediaStore {
    /// Create a store that fetches remote sources over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: CatalogueConfig,
        repository: Arc<dyn MediaRepository>,
        storage: Arc<dyn MediaStorage>,
    ) -> CatalogueResult<Self> {
        let fetcher = HttpFetcher::from_config(config.media())?;
        Ok(Self::with_fetcher(
            config,
            repository,
            storage,
            Arc::new(fetcher),
        ))
    }

    /// Create a store with a custom remote fetcher.
    pub fn with_fetcher(
        config: CatalogueConfig,
        repository: Arc<dyn MediaRepository>,
        storage: Arc<dyn MediaStorage>,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        let ingestor = Ingestor::new(fetcher, config.media().clone());
        Self {
            repository,
            storage,
            ingestor,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &CatalogueConfig {
        &self.config
    }

    /// Configured locales, code to label.
    pub fn locales(&self) -> &BTreeMap<String, String> {
        self.config.locales().available()
    }

    /// Locale used when a caller names none.
    pub fn default_locale(&self) -> &str {
        self.config.locales().default_locale()
    }

    fn resolve_locale<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|locale| !locale.is_empty())
            .unwrap_or_else(|| self.default_locale())
    }

    /// Serialize mutations of one collection.
    ///
    /// Entries only the registry still references are idle and dropped here,
    /// so the map tracks collections in use rather than every one ever seen.
    async fn lock(&self, scope: &CollectionScope) -> OwnedMutexGuard<()> {
        let collection_lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(scope.clone()).or_default())
        };
        collection_lock.lock_owned().await
    }

    /// Forget a collection's lock if nobody holds or awaits it.
    async fn release(&self, scope: &CollectionScope) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(scope)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(scope);
        }
    }

    /// Faults in persisted state: ordering first, then cover.
    fn audit(items: &[MediaItem]) -> Vec<ConsistencyFault> {
        let mut faults = OrderingEngine::check(items);
        faults.extend(CoverInvariantEnforcer::check(items));
        faults
    }

    /// Renumber and enforce the cover rule. Returns true if anything changed.
    fn settle(items: &mut [MediaItem]) -> bool {
        let renumbered = OrderingEngine::normalize(items);
        let recovered = !CoverInvariantEnforcer::enforce(items).is_empty();
        renumbered || recovered
    }

    /// Load a collection for mutation, repairing any persisted fault.
    ///
    /// Callers must hold the collection lock.
    async fn load_for_update(
        &self,
        scope: &CollectionScope,
    ) -> CatalogueResult<(Vec<MediaItem>, Vec<ConsistencyFault>)> {
        let mut items = self.repository.load(scope).await?;
        let faults = Self::audit(&items);
        for fault in &faults {
            warn!(scope = %scope, fault = %fault.kind, "Repairing consistency fault");
        }
        if Self::settle(&mut items) {
            self.repository.save(scope, &items).await?;
        }
        Ok((items, faults))
    }

    fn report(&self, operation: Operation) -> OperationReport {
        OperationReport::new(operation, *self.config.media().failure_report_limit())
    }

    fn urls(&self, blob: &BlobReference) -> MediaUrls {
        MediaUrls {
            url: self.storage.url(blob, MediaVariant::Original),
            thumb_url: self.storage.url(blob, MediaVariant::Thumb),
            preview_url: self.storage.url(blob, MediaVariant::Preview),
        }
    }

    fn project(&self, items: &[MediaItem], locale: &str) -> Vec<MediaItemView> {
        items
            .iter()
            .map(|item| {
                MediaItemView::project(item, self.urls(&item.blob), locale, self.default_locale())
            })
            .collect()
    }

    /// Settle, save and attach the resulting list to a report.
    async fn finish(
        &self,
        scope: &CollectionScope,
        mut items: Vec<MediaItem>,
        mut report: OperationReport,
    ) -> CatalogueResult<OperationReport> {
        Self::settle(&mut items);
        self.repository.save(scope, &items).await?;
        report.items = self.project(&items, self.default_locale());
        Ok(report)
    }

    async fn delete_blob(&self, item: &MediaItem) {
        if let Err(e) = self.storage.delete(&item.blob).await {
            warn!(item = %item.external_ref, error = %e, "Failed to delete media content");
        }
    }

    /// Items of a collection in display order.
    ///
    /// Read-only: faults are logged here and repaired by the next mutation or
    /// by [`MediaStore::check_consistency`].
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn items(&self, scope: &CollectionScope) -> CatalogueResult<Vec<MediaItem>> {
        let mut items = self.repository.load(scope).await?;
        for fault in Self::audit(&items) {
            warn!(fault = %fault.kind, "Consistency fault in persisted collection");
        }
        OrderingEngine::sort(&mut items);
        debug!(count = items.len(), "Listed collection");
        Ok(items)
    }

    /// View-friendly list for `locale` (default locale when `None`).
    pub async fn list(
        &self,
        scope: &CollectionScope,
        locale: Option<&str>,
    ) -> CatalogueResult<Vec<MediaItemView>> {
        let items = self.items(scope).await?;
        Ok(self.project(&items, self.resolve_locale(locale)))
    }

    /// Ingest a source and store its bytes.
    async fn stage(&self, source: &MediaSource) -> Result<StagedItem, IngestionError> {
        let content = self.ingestor.ingest(source).await?;
        let external_ref = ExternalRef::generate();
        let metadata = MediaMetadata {
            external_ref,
            file_name: content.file_name.clone(),
            mime_type: content.mime_type.clone(),
        };
        let blob = self
            .storage
            .store(&content.bytes, &metadata)
            .await
            .map_err(|e| IngestionError::new(IngestionErrorKind::Storage(e.to_string())))?;
        Ok(StagedItem {
            external_ref,
            file_name: content.file_name,
            mime_type: content.mime_type,
            byte_size: content.bytes.len() as u64,
            blob,
        })
    }

    /// Turn staged content into a record at the end of `items` and persist.
    async fn append(
        &self,
        scope: &CollectionScope,
        items: &mut Vec<MediaItem>,
        staged: StagedItem,
        is_cover: bool,
    ) -> CatalogueResult<MediaItem> {
        let id = self.repository.next_id().await?;
        let item = MediaItem {
            id,
            external_ref: staged.external_ref,
            name: Default::default(),
            description: Default::default(),
            is_cover,
            position: OrderingEngine::next_position(items),
            file_name: staged.file_name,
            mime_type: staged.mime_type,
            byte_size: staged.byte_size,
            blob: staged.blob,
            created_at: chrono::Utc::now(),
        };
        items.push(item.clone());
        if let Err(e) = self.repository.save(scope, items).await {
            items.pop();
            self.delete_blob(&item).await;
            return Err(e);
        }
        info!(item = %item.external_ref, position = item.position, "Added media item");
        Ok(item)
    }

    /// Add one item, optionally with initial text.
    ///
    /// The item goes to the end of the collection and becomes the cover only
    /// if the collection was empty.
    ///
    /// # Errors
    ///
    /// Fails with an ingestion error if the source cannot be read or fetched.
    #[instrument(skip(self, metadata), fields(scope = %scope, locator = %source.locator()))]
    pub async fn add(
        &self,
        scope: &CollectionScope,
        source: &MediaSource,
        metadata: ItemEdit,
    ) -> CatalogueResult<MediaItem> {
        let _guard = self.lock(scope).await;
        let (mut items, _) = self.load_for_update(scope).await?;

        let staged = self.stage(source).await?;
        let was_empty = items.is_empty();
        let added = self.append(scope, &mut items, staged, was_empty).await?;

        if metadata.is_empty() {
            return Ok(added);
        }

        let locale = self.resolve_locale(metadata.locale.as_deref()).to_string();
        if let Some(item) = items.last_mut() {
            if let Some(name) = metadata.name {
                item.name.set(locale.clone(), name);
            }
            if let Some(description) = metadata.description {
                item.description.set(locale, description);
            }
        }
        if metadata.is_cover == Some(true) {
            CoverInvariantEnforcer::set_cover(&mut items, added.external_ref);
        }

        Self::settle(&mut items);
        self.repository.save(scope, &items).await?;
        Ok(items
            .into_iter()
            .find(|item| item.external_ref == added.external_ref)
            .unwrap_or(added))
    }

    /// Ingest sources one by one; a failure never stops the rest.
    async fn ingest_batch(
        &self,
        scope: &CollectionScope,
        sources: &[MediaSource],
        operation: Operation,
    ) -> CatalogueResult<OperationReport> {
        let _guard = self.lock(scope).await;
        let (mut items, _) = self.load_for_update(scope).await?;
        let was_empty = items.is_empty();
        let mut report = self.report(operation);

        for source in sources {
            match self.stage(source).await {
                Ok(staged) => {
                    let is_cover = was_empty && report.succeeded == 0;
                    self.append(scope, &mut items, staged, is_cover).await?;
                    report.record_success();
                }
                Err(e) => {
                    warn!(locator = %source.locator(), error = %e.kind, "Failed to ingest source");
                    report.record_failure(source.locator(), &e);
                }
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failures.len(),
            "Batch ingestion complete"
        );
        self.finish(scope, items, report).await
    }

    /// Upload local files.
    #[instrument(skip(self, files), fields(scope = %scope, count = files.len()))]
    pub async fn upload_files(
        &self,
        scope: &CollectionScope,
        files: &[MediaSource],
    ) -> CatalogueResult<OperationReport> {
        self.ingest_batch(scope, files, Operation::UploadFiles).await
    }

    /// Fetch newline-delimited URLs into the collection.
    #[instrument(skip(self, text), fields(scope = %scope))]
    pub async fn upload_urls(
        &self,
        scope: &CollectionScope,
        text: &str,
    ) -> CatalogueResult<OperationReport> {
        let sources: Vec<MediaSource> = parse_url_list(text)
            .into_iter()
            .map(MediaSource::remote)
            .collect();
        debug!(count = sources.len(), "Parsed URL list");
        self.ingest_batch(scope, &sources, Operation::AddUrls).await
    }

    /// Merge text for one locale into an item, and optionally change its cover flag.
    ///
    /// A missing item is reported as a warning and nothing changes.
    #[instrument(skip(self, edit), fields(scope = %scope, item = %target))]
    pub async fn update(
        &self,
        scope: &CollectionScope,
        target: ExternalRef,
        edit: ItemEdit,
    ) -> CatalogueResult<OperationReport> {
        let _guard = self.lock(scope).await;
        let (mut items, _) = self.load_for_update(scope).await?;
        let mut report = self.report(Operation::Update);

        let locale = self.resolve_locale(edit.locale.as_deref()).to_string();
        let Some(item) = items.iter_mut().find(|item| item.external_ref == target) else {
            let missing = NotFoundError::new(target.to_string());
            warn!(error = %missing, "Edit target not found");
            report.warn("Could not find image to update");
            return self.finish(scope, items, report).await;
        };

        if let Some(name) = edit.name {
            item.name.set(locale.clone(), name);
        }
        if let Some(description) = edit.description {
            item.description.set(locale, description);
        }
        match edit.is_cover {
            Some(true) => {
                CoverInvariantEnforcer::set_cover(&mut items, target);
            }
            Some(false) => {
                item.is_cover = false;
                CoverInvariantEnforcer::enforce(&mut items);
                if items
                    .iter()
                    .any(|item| item.external_ref == target && item.is_cover)
                {
                    warn!("Cover flag cleared on the image that must stay cover");
                    report.warn("Image kept as cover; set another image as cover instead");
                }
            }
            None => {}
        }

        report.record_success();
        info!("Updated media item");
        self.finish(scope, items, report).await
    }

    /// Make one item the cover.
    ///
    /// A missing item is reported as a warning and nothing changes.
    #[instrument(skip(self), fields(scope = %scope, item = %target))]
    pub async fn set_cover(
        &self,
        scope: &CollectionScope,
        target: ExternalRef,
    ) -> CatalogueResult<OperationReport> {
        let _guard = self.lock(scope).await;
        let (mut items, _) = self.load_for_update(scope).await?;
        let mut report = self.report(Operation::SetCover);

        if CoverInvariantEnforcer::set_cover(&mut items, target) {
            report.record_success();
            info!("Cover changed");
        } else {
            let missing = NotFoundError::new(target.to_string());
            warn!(error = %missing, "Cover target not found");
            report.warn("Could not find image to set as cover");
        }
        self.finish(scope, items, report).await
    }

    /// Delete an item and its content. Deleting a missing item is a no-op.
    ///
    /// If the cover goes, the item now at the lowest position takes over.
    #[instrument(skip(self), fields(scope = %scope, item = %target))]
    pub async fn remove(
        &self,
        scope: &CollectionScope,
        target: ExternalRef,
    ) -> CatalogueResult<OperationReport> {
        let _guard = self.lock(scope).await;
        let (mut items, _) = self.load_for_update(scope).await?;
        let mut report = self.report(Operation::Remove);

        match items.iter().position(|item| item.external_ref == target) {
            Some(index) => {
                let removed = items.remove(index);
                self.delete_blob(&removed).await;
                report.record_success();
                info!(was_cover = removed.is_cover, "Removed media item");
            }
            None => {
                debug!("Item already gone");
                report.warn("Could not find image to delete");
            }
        }
        self.finish(scope, items, report).await
    }

    /// Apply a complete new order.
    ///
    /// # Errors
    ///
    /// Fails with an ordering error, changing nothing, unless `sequence`
    /// names every item exactly once.
    #[instrument(skip(self, sequence), fields(scope = %scope, count = sequence.len()))]
    pub async fn reorder(
        &self,
        scope: &CollectionScope,
        sequence: &[ExternalRef],
    ) -> CatalogueResult<OperationReport> {
        let _guard = self.lock(scope).await;
        self.reorder_locked(scope, sequence, Operation::Reorder).await
    }

    async fn reorder_locked(
        &self,
        scope: &CollectionScope,
        sequence: &[ExternalRef],
        operation: Operation,
    ) -> CatalogueResult<OperationReport> {
        let (mut items, _) = self.load_for_update(scope).await?;
        OrderingEngine::reorder(&mut items, sequence)?;

        let mut report = self.report(operation);
        report.succeeded = items.len();
        info!("Reordered collection");
        self.finish(scope, items, report).await
    }

    /// Move the item at display index `from` to index `to`.
    ///
    /// # Errors
    ///
    /// Fails with an ordering error if either index is out of range.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn move_item(
        &self,
        scope: &CollectionScope,
        from: usize,
        to: usize,
    ) -> CatalogueResult<OperationReport> {
        let _guard = self.lock(scope).await;
        let (items, _) = self.load_for_update(scope).await?;
        let current: Vec<ExternalRef> = items.iter().map(|item| item.external_ref).collect();
        let sequence = OrderingEngine::preview_move(&current, from, to)?;
        self.reorder_locked(scope, &sequence, Operation::Move).await
    }

    /// Save the client's whole list in display order.
    ///
    /// Persisted items the list omits are deleted. Listed items get their
    /// text maps and cover flag replaced. Unknown references are skipped
    /// with a warning.
    #[instrument(skip(self, entries), fields(scope = %scope, count = entries.len()))]
    pub async fn commit(
        &self,
        scope: &CollectionScope,
        entries: &[CommitEntry],
    ) -> CatalogueResult<OperationReport> {
        let _guard = self.lock(scope).await;
        let (items, _) = self.load_for_update(scope).await?;
        let mut report = self.report(Operation::Commit);

        let mut by_ref: HashMap<ExternalRef, MediaItem> = items
            .into_iter()
            .map(|item| (item.external_ref, item))
            .collect();

        let mut kept = Vec::with_capacity(entries.len());
        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert(entry.external_ref) {
                continue;
            }
            let Some(mut item) = by_ref.remove(&entry.external_ref) else {
                warn!(item = %entry.external_ref, "Commit names an unknown item");
                report.warn(format!("Skipped unknown image {}", entry.external_ref));
                continue;
            };
            item.name = entry.name.clone();
            item.description = entry.description.clone();
            item.is_cover = entry.is_cover;
            item.position = kept.len() as u32;
            kept.push(item);
        }

        // Whatever the client no longer lists was deleted there.
        let mut dropped: Vec<MediaItem> = by_ref.into_values().collect();
        OrderingEngine::sort(&mut dropped);
        for item in &dropped {
            self.delete_blob(item).await;
        }

        report.succeeded = kept.len();
        info!(kept = kept.len(), deleted = dropped.len(), "Committed collection");
        self.finish(scope, kept, report).await
    }

    /// Delete a whole collection and its content, as when its owner is deleted.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn delete_collection(
        &self,
        scope: &CollectionScope,
    ) -> CatalogueResult<OperationReport> {
        let guard = self.lock(scope).await;
        let removed = self.repository.delete_collection(scope).await?;
        for item in &removed {
            self.delete_blob(item).await;
        }
        drop(guard);
        self.release(scope).await;

        let mut report = self.report(Operation::Purge);
        report.succeeded = removed.len();
        info!(count = removed.len(), "Deleted collection");
        Ok(report)
    }

    /// Detect, log and repair faults in persisted state. Returns the faults found.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn check_consistency(
        &self,
        scope: &CollectionScope,
    ) -> CatalogueResult<Vec<ConsistencyFault>> {
        let _guard = self.lock(scope).await;
        let (_, faults) = self.load_for_update(scope).await?;
        if faults.is_empty() {
            debug!("Collection is consistent");
        } else {
            info!(count = faults.len(), "Repaired collection");
        }
        Ok(faults)
    }
}
