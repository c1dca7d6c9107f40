//! Configuration for the media subsystem.
//!
//! Configuration is TOML, merged from:
//! - Bundled defaults (include_str! from catalogue.toml)
//! - User overrides (~/.config/catalogue/catalogue.toml, then ./catalogue.toml)
//!
//! Later sources override earlier ones field by field.

use catalogue_error::{CatalogueError, CatalogueResult, ConfigError};
use config::{Config, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

/// Ingestion and reporting settings.
///
/// # Example
///
/// ```toml
/// [media]
/// collection = "images"
/// accepted_mime_types = ["image/jpeg", "image/png"]
/// fetch_timeout_secs = 10
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct MediaConfig {
    /// Collection (bucket) name used when a caller does not name one
    #[serde(default = "default_collection")]
    collection: String,

    /// MIME types accepted at ingestion
    #[serde(default = "default_accepted_mime_types")]
    accepted_mime_types: Vec<String>,

    /// Upper bound on a single remote fetch (seconds)
    #[serde(default = "default_fetch_timeout_secs")]
    fetch_timeout_secs: u64,

    /// Largest body accepted from a file or URL
    #[serde(default = "default_max_download_bytes")]
    max_download_bytes: u64,

    /// How many failed sources a summary names before "and N more"
    #[serde(default = "default_failure_report_limit")]
    failure_report_limit: usize,
}

fn default_collection() -> String {
    "images".to_string()
}

fn default_accepted_mime_types() -> Vec<String> {
    ["image/jpeg", "image/png", "image/gif", "image/webp"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_max_download_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_failure_report_limit() -> usize {
    3
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            accepted_mime_types: default_accepted_mime_types(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_download_bytes: default_max_download_bytes(),
            failure_report_limit: default_failure_report_limit(),
        }
    }
}

impl MediaConfig {
    /// Fetch timeout as a `Duration`.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Whether a bare MIME type is accepted (case-insensitive).
    pub fn accepts(&self, mime_type: &str) -> bool {
        self.accepted_mime_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(mime_type))
    }
}

/// Locales offered for item names and descriptions.
///
/// ```toml
/// [locales]
/// default = "en"
///
/// [locales.available]
/// en = "English"
/// sl = "Slovenščina"
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct LocaleConfig {
    /// Fallback locale for lookups and for edits that name none
    #[serde(rename = "default", default = "default_locale")]
    default_locale: String,

    /// Locale code to human label
    #[serde(default = "default_available_locales")]
    available: BTreeMap<String, String>,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_available_locales() -> BTreeMap<String, String> {
    BTreeMap::from([("en".to_string(), "English".to_string())])
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            available: default_available_locales(),
        }
    }
}

/// Where binaries and collection records are kept.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct StorageConfig {
    /// Root directory
    #[serde(default = "default_storage_path")]
    path: PathBuf,

    /// Base URL the root directory is served under, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[setters(strip_option)]
    public_base_url: Option<String>,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("catalogue-data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    /// Directory for binary content.
    pub fn media_dir(&self) -> PathBuf {
        self.path.join("media")
    }

    /// Directory for collection records.
    pub fn records_dir(&self) -> PathBuf {
        self.path.join("collections")
    }
}

/// Top-level catalogue configuration.
///
/// # Example
///
/// ```no_run
/// use catalogue_media::CatalogueConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CatalogueConfig::load()?;
/// println!("Fetch timeout: {:?}", config.media().fetch_timeout());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct CatalogueConfig {
    /// Ingestion and reporting
    #[serde(default)]
    media: MediaConfig,

    /// Locales
    #[serde(default)]
    locales: LocaleConfig,

    /// Storage locations
    #[serde(default)]
    storage: StorageConfig,
}

impl CatalogueConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> CatalogueResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                CatalogueError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CatalogueError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> CatalogueResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../catalogue.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/catalogue/catalogue.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("catalogue").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                CatalogueError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CatalogueError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the media service cannot run with.
    pub fn validate(&self) -> CatalogueResult<()> {
        if self.media.fetch_timeout_secs == 0 {
            return Err(ConfigError::new("media.fetch_timeout_secs must be positive").into());
        }
        if self.media.accepted_mime_types.is_empty() {
            return Err(ConfigError::new("media.accepted_mime_types must not be empty").into());
        }
        if self.media.collection.trim().is_empty() {
            return Err(ConfigError::new("media.collection must not be empty").into());
        }
        if !self.locales.available.contains_key(&self.locales.default_locale) {
            return Err(ConfigError::new(format!(
                "locales.default '{}' is not in locales.available",
                self.locales.default_locale
            ))
            .into());
        }
        Ok(())
    }
}
