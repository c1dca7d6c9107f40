//! Tests for the media service: ordering, cover rule, partial-failure batches.

use async_trait::async_trait;
use catalogue_core::{
    CollectionScope, CommitEntry, ExternalRef, ItemEdit, LocalizedText, MediaItem, MediaSource,
    Owner,
};
use catalogue_error::{
    CatalogueErrorKind, ConsistencyFaultKind, IngestionError, IngestionErrorKind,
    OrderingErrorKind,
};
use catalogue_media::{
    CatalogueConfig, FetchedContent, InMemoryMediaRepository, MediaRepository, MediaStore,
    RemoteFetcher,
};
use catalogue_storage::{FileSystemStorage, MediaStorage};
use reqwest::Url;
use std::sync::Arc;
use tempfile::TempDir;

/// Serves every URL on host `good`; everything else is unreachable.
struct StubFetcher;

#[async_trait]
impl RemoteFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedContent, IngestionError> {
        match url.host_str() {
            Some("good") => Ok(FetchedContent {
                bytes: url.path().as_bytes().to_vec(),
                content_type: Some("image/jpeg".to_string()),
            }),
            _ => Err(IngestionError::new(IngestionErrorKind::Unreachable(
                url.to_string(),
            ))),
        }
    }
}

struct Harness {
    _temp_dir: TempDir,
    store: Arc<MediaStore>,
    repository: Arc<InMemoryMediaRepository>,
    storage: Arc<FileSystemStorage>,
    scope: CollectionScope,
}

fn harness() -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(
        FileSystemStorage::new(temp_dir.path().join("media"))
            .unwrap()
            .with_public_base_url("https://cdn.example.com/media"),
    );
    let repository = Arc::new(InMemoryMediaRepository::new());
    let store = MediaStore::with_fetcher(
        CatalogueConfig::default(),
        repository.clone(),
        storage.clone(),
        Arc::new(StubFetcher),
    );
    Harness {
        _temp_dir: temp_dir,
        store: Arc::new(store),
        repository,
        storage,
        scope: CollectionScope::new("shop", Owner::product(42), "images"),
    }
}

/// Seed `names.len()` items named after the given labels; the first is cover.
async fn seed(h: &Harness, names: &[&str]) -> Vec<ExternalRef> {
    let urls: Vec<String> = names
        .iter()
        .map(|name| format!("https://good/{}.jpg", name))
        .collect();
    let report = h.store.upload_urls(&h.scope, &urls.join("\n")).await.unwrap();
    assert_eq!(report.succeeded, names.len());
    report.items.iter().map(|view| view.uuid).collect()
}

fn assert_invariants(items: &[MediaItem]) {
    let mut positions: Vec<u32> = items.iter().map(|item| item.position).collect();
    positions.sort_unstable();
    assert_eq!(positions, (0..items.len() as u32).collect::<Vec<_>>());

    let covers = items.iter().filter(|item| item.is_cover).count();
    assert_eq!(covers, usize::from(!items.is_empty()));
}

fn cover_of(items: &[MediaItem]) -> Option<ExternalRef> {
    items
        .iter()
        .find(|item| item.is_cover)
        .map(|item| item.external_ref)
}

fn order_of(items: &[MediaItem]) -> Vec<ExternalRef> {
    items.iter().map(|item| item.external_ref).collect()
}

#[tokio::test]
async fn test_partial_batch_success_on_empty_collection() {
    let h = harness();

    let report = h
        .store
        .upload_urls(
            &h.scope,
            "https://good/img.jpg\nnot-a-url\nhttps://unreachable/x.jpg",
        )
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.locator.as_str()).collect();
    assert_eq!(failed, vec!["not-a-url", "https://unreachable/x.jpg"]);
    assert!(matches!(
        report.failures[0].kind,
        IngestionErrorKind::InvalidUrl(_)
    ));
    assert!(matches!(
        report.failures[1].kind,
        IngestionErrorKind::Unreachable(_)
    ));
    assert_eq!(
        report.summary(),
        vec![
            "1 image(s) added successfully".to_string(),
            "Some URLs failed. Failed URLs: not-a-url, https://unreachable/x.jpg".to_string(),
        ]
    );

    let items = h.store.items(&h.scope).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].position, 0);
    assert!(items[0].is_cover);
    assert_eq!(items[0].file_name, "img.jpg");
    assert_eq!(items[0].mime_type, "image/jpeg");
}

#[tokio::test]
async fn test_batch_appends_without_taking_cover() {
    let h = harness();
    let seeded = seed(&h, &["a", "b"]).await;

    let report = h
        .store
        .upload_urls(&h.scope, "https://good/c.jpg\n\n  https://nowhere/d.jpg  \n")
        .await
        .unwrap();
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures.len(), 1);

    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_eq!(items[2].file_name, "c.jpg");
    assert_eq!(items[2].position, 2);
    assert!(!items[2].is_cover);
    assert_eq!(cover_of(&items), Some(seeded[0]));
}

#[tokio::test]
async fn test_first_success_in_batch_takes_cover_after_failure() {
    let h = harness();

    h.store
        .upload_urls(&h.scope, "https://down/a.jpg\nhttps://good/b.jpg\nhttps://good/c.jpg")
        .await
        .unwrap();

    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_eq!(items[0].file_name, "b.jpg");
    assert!(items[0].is_cover);
}

#[tokio::test]
async fn test_failure_report_is_bounded() {
    let h = harness();
    let urls: Vec<String> = (0..5).map(|i| format!("https://down/{}.jpg", i)).collect();

    let report = h.store.upload_urls(&h.scope, &urls.join("\n")).await.unwrap();

    assert_eq!(report.succeeded, 0);
    assert_eq!(
        report.summary(),
        vec![
            "Some URLs failed. Failed URLs: https://down/0.jpg, https://down/1.jpg, https://down/2.jpg and 2 more"
                .to_string()
        ]
    );
    assert!(h.store.items(&h.scope).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_cover_reassigns_to_lowest_position() {
    let h = harness();
    let refs = seed(&h, &["a", "b", "c"]).await;
    let before = h.store.items(&h.scope).await.unwrap();
    assert_eq!(cover_of(&before), Some(refs[0]));

    let report = h.store.remove(&h.scope, refs[0]).await.unwrap();
    assert_eq!(report.summary(), vec!["Image deleted".to_string()]);

    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_eq!(order_of(&items), vec![refs[1], refs[2]]);
    assert_eq!(cover_of(&items), Some(refs[1]));

    // Bytes go with the record
    assert!(!h.storage.exists(&before[0].blob).await.unwrap());
    assert!(h.storage.exists(&before[1].blob).await.unwrap());
}

#[tokio::test]
async fn test_remove_missing_item_is_noop() {
    let h = harness();
    let refs = seed(&h, &["a", "b"]).await;
    let before = h.store.items(&h.scope).await.unwrap();

    let report = h.store.remove(&h.scope, ExternalRef::generate()).await.unwrap();
    assert_eq!(report.succeeded, 0);
    assert_eq!(
        report.summary(),
        vec!["Could not find image to delete".to_string()]
    );
    assert_eq!(h.store.items(&h.scope).await.unwrap(), before);

    // Removing twice is fine too
    h.store.remove(&h.scope, refs[1]).await.unwrap();
    h.store.remove(&h.scope, refs[1]).await.unwrap();
    assert_eq!(h.store.items(&h.scope).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_last_item_empties_collection() {
    let h = harness();
    let refs = seed(&h, &["a"]).await;

    let report = h.store.remove(&h.scope, refs[0]).await.unwrap();
    assert!(report.items.is_empty());
    assert!(h.repository.is_empty().await);
}

#[tokio::test]
async fn test_reorder_end_to_end_keeps_cover() {
    let h = harness();
    let refs = seed(&h, &["a", "b", "c"]).await;
    let (a, b, c) = (refs[0], refs[1], refs[2]);

    let report = h.store.reorder(&h.scope, &[c, a, b]).await.unwrap();
    let positions: Vec<(ExternalRef, u32)> =
        report.items.iter().map(|view| (view.uuid, view.position)).collect();
    assert_eq!(positions, vec![(c, 0), (a, 1), (b, 2)]);

    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_eq!(cover_of(&items), Some(a));
}

#[tokio::test]
async fn test_reorder_rejects_mismatched_sets() {
    let h = harness();
    let refs = seed(&h, &["a", "b", "c"]).await;
    let before = h.store.items(&h.scope).await.unwrap();

    let err = h.store.reorder(&h.scope, &[refs[2], refs[0]]).await.unwrap_err();
    match err.kind() {
        CatalogueErrorKind::Ordering(e) => {
            assert!(matches!(e.kind, OrderingErrorKind::MissingIdentifier(_)))
        }
        other => panic!("expected ordering error, got {}", other),
    }

    let err = h
        .store
        .reorder(&h.scope, &[refs[2], refs[0], refs[1], ExternalRef::generate()])
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), CatalogueErrorKind::Ordering(_)));

    assert_eq!(h.store.items(&h.scope).await.unwrap(), before);
}

#[tokio::test]
async fn test_move_item() {
    let h = harness();
    let refs = seed(&h, &["a", "b", "c", "d"]).await;

    h.store.move_item(&h.scope, 3, 1).await.unwrap();
    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_eq!(order_of(&items), vec![refs[0], refs[3], refs[1], refs[2]]);

    let err = h.store.move_item(&h.scope, 0, 4).await.unwrap_err();
    assert!(matches!(err.kind(), CatalogueErrorKind::Ordering(_)));
}

#[tokio::test]
async fn test_set_cover() {
    let h = harness();
    let refs = seed(&h, &["a", "b", "c"]).await;

    let report = h.store.set_cover(&h.scope, refs[2]).await.unwrap();
    assert_eq!(report.summary(), vec!["Cover image updated".to_string()]);
    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_eq!(cover_of(&items), Some(refs[2]));

    // Unknown target warns and changes nothing
    let report = h.store.set_cover(&h.scope, ExternalRef::generate()).await.unwrap();
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(cover_of(&h.store.items(&h.scope).await.unwrap()), Some(refs[2]));
}

#[tokio::test]
async fn test_update_merges_per_locale() {
    let h = harness();
    let refs = seed(&h, &["a", "b"]).await;

    h.store
        .update(&h.scope, refs[1], ItemEdit::for_locale(None).name("Front view"))
        .await
        .unwrap();
    let report = h
        .store
        .update(
            &h.scope,
            refs[1],
            ItemEdit::for_locale(Some("sl"))
                .name("Pogled od spredaj")
                .description("Opis"),
        )
        .await
        .unwrap();
    assert_eq!(report.summary(), vec!["Image details updated".to_string()]);

    let items = h.store.items(&h.scope).await.unwrap();
    assert_eq!(items[1].name.get("en"), Some("Front view"));
    assert_eq!(items[1].name.get("sl"), Some("Pogled od spredaj"));
    assert_eq!(items[1].description.get("sl"), Some("Opis"));
    assert_eq!(items[1].description.get("en"), None);

    // Missing locale falls back to the default, then to the file name
    let views = h.store.list(&h.scope, Some("de")).await.unwrap();
    assert_eq!(views[1].display_name, "Front view");
    assert_eq!(views[1].display_description, "");
    assert_eq!(views[0].display_name, "a.jpg");
    let views = h.store.list(&h.scope, Some("sl")).await.unwrap();
    assert_eq!(views[1].display_name, "Pogled od spredaj");
    assert_eq!(views[1].display_description, "Opis");
}

#[tokio::test]
async fn test_update_cover_flag_and_missing_target() {
    let h = harness();
    let refs = seed(&h, &["a", "b"]).await;

    h.store
        .update(&h.scope, refs[1], ItemEdit::default().cover(true))
        .await
        .unwrap();
    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_eq!(cover_of(&items), Some(refs[1]));

    let before = items;
    let report = h
        .store
        .update(&h.scope, ExternalRef::generate(), ItemEdit::default().name("x"))
        .await
        .unwrap();
    assert_eq!(
        report.summary(),
        vec!["Could not find image to update".to_string()]
    );
    assert_eq!(h.store.items(&h.scope).await.unwrap(), before);
}

#[tokio::test]
async fn test_clearing_cover_on_first_item_is_reported() {
    let h = harness();
    let refs = seed(&h, &["a", "b"]).await;

    let report = h
        .store
        .update(&h.scope, refs[0], ItemEdit::default().name("Front").cover(false))
        .await
        .unwrap();
    assert_eq!(report.succeeded, 1);
    assert!(!report.is_clean());
    assert!(report
        .summary()
        .contains(&"Image kept as cover; set another image as cover instead".to_string()));
    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_eq!(cover_of(&items), Some(refs[0]));

    h.store.set_cover(&h.scope, refs[1]).await.unwrap();
    let report = h
        .store
        .update(&h.scope, refs[1], ItemEdit::default().cover(false))
        .await
        .unwrap();
    assert!(report.is_clean());
    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_eq!(cover_of(&items), Some(refs[0]));
}

#[tokio::test]
async fn test_list_projects_urls() {
    let h = harness();
    seed(&h, &["a"]).await;

    let views = h.store.list(&h.scope, None).await.unwrap();
    let view = &views[0];
    assert!(
        view.urls
            .url
            .as_deref()
            .unwrap()
            .starts_with("https://cdn.example.com/media/")
    );
    assert!(view.urls.thumb_url.as_deref().unwrap().ends_with("/conversions/a-thumb.jpg"));
    assert!(view.urls.preview_url.as_deref().unwrap().ends_with("/conversions/a-preview.jpg"));
    assert!(view.is_cover);
}

#[tokio::test]
async fn test_upload_local_files() {
    let h = harness();
    let uploads = TempDir::new().unwrap();
    let png = uploads.path().join("livewire-tmp-1");
    std::fs::write(&png, b"\x89PNG fake").unwrap();
    let text = uploads.path().join("notes.txt");
    std::fs::write(&text, b"not an image").unwrap();

    let report = h
        .store
        .upload_files(
            &h.scope,
            &[
                MediaSource::local(&png, Some("front.png")),
                MediaSource::local(uploads.path().join("gone"), Some("gone.jpg")),
                MediaSource::local(&text, None),
            ],
        )
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures.len(), 2);
    assert!(matches!(
        report.failures[0].kind,
        IngestionErrorKind::MissingFile(_)
    ));
    assert!(matches!(
        report.failures[1].kind,
        IngestionErrorKind::UnsupportedMimeType(_)
    ));
    assert_eq!(report.summary()[0], "1 image(s) uploaded successfully");

    let items = h.store.items(&h.scope).await.unwrap();
    assert_eq!(items[0].file_name, "front.png");
    assert_eq!(items[0].mime_type, "image/png");
    assert_eq!(items[0].byte_size, 9);
    assert_eq!(
        h.storage.retrieve(&items[0].blob).await.unwrap(),
        b"\x89PNG fake"
    );
}

#[tokio::test]
async fn test_add_single_with_metadata() {
    let h = harness();
    let refs = seed(&h, &["a"]).await;

    let item = h
        .store
        .add(
            &h.scope,
            &MediaSource::remote("https://good/b.jpg"),
            ItemEdit::for_locale(Some("en")).name("Back").cover(true),
        )
        .await
        .unwrap();
    assert_eq!(item.position, 1);
    assert!(item.is_cover);
    assert_eq!(item.name.get("en"), Some("Back"));

    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_ne!(cover_of(&items), Some(refs[0]));

    let err = h
        .store
        .add(&h.scope, &MediaSource::remote("ftp://good/c.jpg"), ItemEdit::default())
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), CatalogueErrorKind::Ingestion(_)));
    assert_eq!(h.store.items(&h.scope).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_commit_replaces_state() {
    let h = harness();
    let refs = seed(&h, &["a", "b", "c"]).await;
    let before = h.store.items(&h.scope).await.unwrap();

    let entries = vec![
        CommitEntry {
            external_ref: refs[2],
            name: LocalizedText::from_iter([("en".to_string(), "Third".to_string())]),
            description: LocalizedText::new(),
            is_cover: true,
        },
        CommitEntry {
            external_ref: ExternalRef::generate(),
            name: LocalizedText::new(),
            description: LocalizedText::new(),
            is_cover: false,
        },
        CommitEntry {
            external_ref: refs[0],
            name: LocalizedText::new(),
            description: LocalizedText::new(),
            is_cover: false,
        },
    ];
    let report = h.store.commit(&h.scope, &entries).await.unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.warnings.len(), 1);

    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert_eq!(order_of(&items), vec![refs[2], refs[0]]);
    assert_eq!(cover_of(&items), Some(refs[2]));
    assert_eq!(items[0].name.get("en"), Some("Third"));

    // b was dropped by the client
    assert!(!h.storage.exists(&before[1].blob).await.unwrap());
}

#[tokio::test]
async fn test_check_consistency_repairs_persisted_faults() {
    let h = harness();
    seed(&h, &["a", "b", "c"]).await;

    // Corrupt the stored collection behind the service's back
    let mut items = h.repository.load(&h.scope).await.unwrap();
    items[0].position = 4;
    items[1].position = 4;
    items[2].position = 9;
    for item in &mut items {
        item.is_cover = true;
    }
    h.repository.save(&h.scope, &items).await.unwrap();

    let faults = h.store.check_consistency(&h.scope).await.unwrap();
    let kinds: Vec<ConsistencyFaultKind> = faults.into_iter().map(|f| f.kind).collect();
    assert!(kinds.contains(&ConsistencyFaultKind::DuplicatePosition {
        position: 4,
        count: 2
    }));
    assert!(kinds.contains(&ConsistencyFaultKind::MultipleCovers(3)));

    let repaired = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&repaired);
    // Ties broken by persisted id
    assert_eq!(order_of(&repaired), order_of(&items));

    assert!(h.store.check_consistency(&h.scope).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mutation_repairs_missing_cover() {
    let h = harness();
    seed(&h, &["a", "b"]).await;

    let mut items = h.repository.load(&h.scope).await.unwrap();
    for item in &mut items {
        item.is_cover = false;
    }
    h.repository.save(&h.scope, &items).await.unwrap();

    h.store.upload_urls(&h.scope, "https://good/c.jpg").await.unwrap();
    let items = h.store.items(&h.scope).await.unwrap();
    assert_invariants(&items);
    assert!(items[0].is_cover);
}

#[tokio::test]
async fn test_delete_collection_purges_items_and_content() {
    let h = harness();
    seed(&h, &["a", "b"]).await;
    let items = h.store.items(&h.scope).await.unwrap();

    let report = h.store.delete_collection(&h.scope).await.unwrap();
    assert_eq!(report.summary(), vec!["2 image(s) deleted".to_string()]);
    assert!(h.store.items(&h.scope).await.unwrap().is_empty());
    for item in &items {
        assert!(!h.storage.exists(&item.blob).await.unwrap());
    }
}

#[tokio::test]
async fn test_collections_are_isolated() {
    let h = harness();
    seed(&h, &["a", "b"]).await;
    let other = CollectionScope::new("shop", Owner::category(7), "images");

    h.store.upload_urls(&other, "https://good/x.jpg").await.unwrap();

    let items = h.store.items(&other).await.unwrap();
    assert_invariants(&items);
    assert_eq!(items.len(), 1);
    assert_eq!(h.store.items(&h.scope).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_batches_keep_invariants() {
    let h = harness();

    let mut handles = Vec::new();
    for task in 0..8 {
        let store = Arc::clone(&h.store);
        let scope = h.scope.clone();
        handles.push(tokio::spawn(async move {
            let urls = format!("https://good/{}-1.jpg\nhttps://good/{}-2.jpg", task, task);
            store.upload_urls(&scope, &urls).await.unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().succeeded, 2);
    }

    let items = h.store.items(&h.scope).await.unwrap();
    assert_eq!(items.len(), 16);
    assert_invariants(&items);
}

#[tokio::test]
async fn test_locales_from_config() {
    let h = harness();
    assert_eq!(h.store.default_locale(), "en");
    assert_eq!(
        h.store.locales().get("en").map(String::as_str),
        Some("English")
    );
}
