//! Tests for configuration loading and validation.

use catalogue_media::CatalogueConfig;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_bundled_defaults() {
    let config = CatalogueConfig::default();
    assert_eq!(config.media().collection(), "images");
    assert_eq!(config.media().fetch_timeout(), Duration::from_secs(30));
    assert_eq!(*config.media().failure_report_limit(), 3);
    assert!(config.media().accepts("image/jpeg"));
    assert!(config.media().accepts("IMAGE/PNG"));
    assert!(!config.media().accepts("text/html"));
    assert_eq!(config.locales().default_locale(), "en");
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_file_overrides_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("catalogue.toml");
    std::fs::write(
        &path,
        r#"
[media]
fetch_timeout_secs = 5
accepted_mime_types = ["image/webp"]

[locales]
default = "sl"

[locales.available]
en = "English"
sl = "Slovenščina"

[storage]
path = "/srv/catalogue"
public_base_url = "https://cdn.example.com"
"#,
    )
    .unwrap();

    let config = CatalogueConfig::from_file(&path).unwrap();
    assert_eq!(config.media().fetch_timeout(), Duration::from_secs(5));
    assert!(config.media().accepts("image/webp"));
    assert!(!config.media().accepts("image/jpeg"));
    // Unset fields keep their defaults
    assert_eq!(config.media().collection(), "images");
    assert_eq!(config.locales().default_locale(), "sl");
    assert_eq!(config.locales().available().len(), 2);
    assert_eq!(
        config.storage().media_dir(),
        std::path::PathBuf::from("/srv/catalogue/media")
    );
    assert_eq!(
        config.storage().public_base_url().as_deref(),
        Some("https://cdn.example.com")
    );
}

#[test]
fn test_validation_rejects_bad_settings() {
    let temp_dir = TempDir::new().unwrap();

    let zero_timeout = temp_dir.path().join("zero.toml");
    std::fs::write(&zero_timeout, "[media]\nfetch_timeout_secs = 0\n").unwrap();
    assert!(CatalogueConfig::from_file(&zero_timeout).is_err());

    let unknown_locale = temp_dir.path().join("locale.toml");
    std::fs::write(&unknown_locale, "[locales]\ndefault = \"fr\"\n").unwrap();
    assert!(CatalogueConfig::from_file(&unknown_locale).is_err());
}

#[test]
fn test_setters_build_config() {
    let config = CatalogueConfig::default().with_media(
        catalogue_media::MediaConfig::default()
            .with_fetch_timeout_secs(2)
            .with_failure_report_limit(1),
    );
    assert_eq!(config.media().fetch_timeout(), Duration::from_secs(2));
    assert_eq!(*config.media().failure_report_limit(), 1);
}
