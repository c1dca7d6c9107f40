//! Tests for filesystem storage backend.

use catalogue_core::{ExternalRef, MediaVariant};
use catalogue_error::{CatalogueErrorKind, StorageErrorKind};
use catalogue_storage::{BlobReference, FileSystemStorage, MediaMetadata, MediaStorage};
use tempfile::TempDir;

fn metadata(file_name: &str) -> MediaMetadata {
    MediaMetadata {
        external_ref: ExternalRef::generate(),
        file_name: file_name.to_string(),
        mime_type: "image/png".to_string(),
    }
}

#[tokio::test]
async fn test_store_and_retrieve() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let data = b"Hello, world!";
    let reference = storage.store(data, &metadata("test.png")).await.unwrap();

    assert_eq!(reference.storage_backend, "filesystem");
    assert!(reference.storage_path.ends_with("/test.png"));
    assert!(!reference.content_hash.is_empty());

    let retrieved = storage.retrieve(&reference).await.unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_same_content_different_items_are_independent() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let data = b"Duplicate content";
    let ref1 = storage.store(data, &metadata("a.png")).await.unwrap();
    let ref2 = storage.store(data, &metadata("a.png")).await.unwrap();

    assert_eq!(ref1.content_hash, ref2.content_hash);
    assert_ne!(ref1.storage_path, ref2.storage_path);

    // Deleting one item's bytes must not touch the other's
    storage.delete(&ref1).await.unwrap();
    assert!(!storage.exists(&ref1).await.unwrap());
    assert!(storage.exists(&ref2).await.unwrap());
}

#[tokio::test]
async fn test_hash_verification() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let reference = storage
        .store(b"Original data", &metadata("x.png"))
        .await
        .unwrap();

    let path = temp_dir.path().join(&reference.storage_path);
    tokio::fs::write(path, b"Corrupted data").await.unwrap();

    let err = storage.retrieve(&reference).await.unwrap_err();
    match err.kind() {
        CatalogueErrorKind::Storage(e) => {
            assert!(matches!(e.kind, StorageErrorKind::HashMismatch { .. }))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_delete_removes_item_directory() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let reference = storage.store(b"Delete me", &metadata("d.jpg")).await.unwrap();
    let item_dir = temp_dir
        .path()
        .join(&reference.storage_path)
        .parent()
        .unwrap()
        .to_path_buf();
    assert!(item_dir.exists());

    storage.delete(&reference).await.unwrap();
    assert!(!storage.exists(&reference).await.unwrap());
    assert!(!item_dir.exists());
}

#[tokio::test]
async fn test_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let fake_reference = BlobReference {
        storage_backend: "filesystem".to_string(),
        storage_path: "aa/bb/missing/fake.png".to_string(),
        content_hash: "nonexistent".to_string(),
    };

    assert!(storage.retrieve(&fake_reference).await.is_err());
    let err = storage.delete(&fake_reference).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        CatalogueErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::NotFound(_))
    ));
}

#[tokio::test]
async fn test_rejects_escaping_paths() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let reference = BlobReference {
        storage_backend: "filesystem".to_string(),
        storage_path: "../outside.png".to_string(),
        content_hash: String::new(),
    };
    assert!(storage.exists(&reference).await.is_err());
}

#[tokio::test]
async fn test_urls_require_public_base() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();
    let reference = storage.store(b"x", &metadata("front.png")).await.unwrap();
    assert!(storage.url(&reference, MediaVariant::Original).is_none());

    let storage = storage.with_public_base_url("https://cdn.example.com/media/");
    let original = storage.url(&reference, MediaVariant::Original).unwrap();
    let thumb = storage.url(&reference, MediaVariant::Thumb).unwrap();
    assert_eq!(
        original,
        format!("https://cdn.example.com/media/{}", reference.storage_path)
    );
    assert!(thumb.ends_with("/conversions/front-thumb.png"));
}
