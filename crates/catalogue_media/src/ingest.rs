//! Turning a [`MediaSource`] into bytes, a MIME type and a file name.
//!
//! Every failure here is an [`IngestionError`] for that one source; batch
//! callers record it and move on.

use async_trait::async_trait;
use catalogue_core::MediaSource;
use catalogue_error::{CatalogueResult, ConfigError, IngestionError, IngestionErrorKind};
use reqwest::Url;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::MediaConfig;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Body and declared type of a remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    /// Response body
    pub bytes: Vec<u8>,
    /// `Content-Type` header, if sent
    pub content_type: Option<String>,
}

/// Fetches remote URLs for ingestion.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fetch `url`, failing with an ingestion error on any transport problem.
    async fn fetch(&self, url: &Url) -> Result<FetchedContent, IngestionError>;
}

/// [`RemoteFetcher`] over HTTP with a hard per-request deadline.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
}

impl HttpFetcher {
    /// Creates a fetcher bounded by `timeout` and `max_bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(timeout: Duration, max_bytes: u64) -> CatalogueResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            timeout,
            max_bytes,
        })
    }

    /// Creates a fetcher from media settings.
    pub fn from_config(config: &MediaConfig) -> CatalogueResult<Self> {
        Self::new(config.fetch_timeout(), *config.max_download_bytes())
    }

    fn transport_error(&self, url: &Url, err: reqwest::Error) -> IngestionError {
        if err.is_timeout() {
            IngestionError::new(IngestionErrorKind::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            })
        } else {
            IngestionError::new(IngestionErrorKind::Unreachable(format!("{}: {}", url, err)))
        }
    }

    async fn fetch_inner(&self, url: &Url) -> Result<FetchedContent, IngestionError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestionError::new(IngestionErrorKind::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }));
        }

        if response
            .content_length()
            .is_some_and(|length| length > self.max_bytes)
        {
            return Err(IngestionError::new(IngestionErrorKind::TooLarge(self.max_bytes)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        // Content-Length may be absent or wrong; enforce the cap per chunk.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(url, e))?
        {
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(IngestionError::new(IngestionErrorKind::TooLarge(self.max_bytes)));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchedContent {
            bytes,
            content_type,
        })
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<FetchedContent, IngestionError> {
        match tokio::time::timeout(self.timeout, self.fetch_inner(url)).await {
            Ok(result) => result,
            Err(_) => Err(IngestionError::new(IngestionErrorKind::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            })),
        }
    }
}

/// Parse and vet a URL for fetching: absolute, http(s), with a host.
pub fn parse_url(raw: &str) -> Result<Url, IngestionError> {
    let url = Url::parse(raw.trim())
        .map_err(|_| IngestionError::new(IngestionErrorKind::InvalidUrl(raw.to_string())))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(IngestionError::new(IngestionErrorKind::UnsupportedScheme(
            url.scheme().to_string(),
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(IngestionError::new(IngestionErrorKind::InvalidUrl(raw.to_string())));
    }
    Ok(url)
}

/// Split newline-delimited input into URLs, trimming and skipping blank lines.
///
/// ```
/// let urls = catalogue_media::parse_url_list(" https://a/1.jpg \n\n\thttps://b/2.png\r\n");
/// assert_eq!(urls, vec!["https://a/1.jpg", "https://b/2.png"]);
/// ```
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Bare lowercase MIME essence: `"Image/JPEG; q=1"` becomes `"image/jpeg"`.
fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn guess_mime(path: impl AsRef<Path>) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

/// Last path segment of a URL, or a generic name.
fn url_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or("image")
        .to_string()
}

/// Content ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedContent {
    /// Raw bytes
    pub bytes: Vec<u8>,
    /// Accepted MIME type
    pub mime_type: String,
    /// File name to store under
    pub file_name: String,
}

/// Resolves sources to content, enforcing MIME and size limits.
#[derive(Clone)]
pub struct Ingestor {
    fetcher: Arc<dyn RemoteFetcher>,
    config: MediaConfig,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Ingestor {
    /// Creates an ingestor using `fetcher` for remote sources.
    pub fn new(fetcher: Arc<dyn RemoteFetcher>, config: MediaConfig) -> Self {
        Self { fetcher, config }
    }

    /// Read or fetch one source.
    #[instrument(skip(self), fields(locator = %source.locator()))]
    pub async fn ingest(&self, source: &MediaSource) -> Result<IngestedContent, IngestionError> {
        let content = match source {
            MediaSource::LocalFile { path, file_name } => {
                self.read_local(path, file_name.as_deref()).await?
            }
            MediaSource::RemoteUrl { url } => self.fetch_remote(url).await?,
        };

        if !self.config.accepts(&content.mime_type) {
            return Err(IngestionError::new(IngestionErrorKind::UnsupportedMimeType(
                content.mime_type,
            )));
        }

        debug!(
            mime_type = %content.mime_type,
            size = content.bytes.len(),
            file_name = %content.file_name,
            "Ingested source"
        );
        Ok(content)
    }

    async fn read_local(
        &self,
        path: &Path,
        file_name: Option<&str>,
    ) -> Result<IngestedContent, IngestionError> {
        let missing = || IngestionError::new(IngestionErrorKind::MissingFile(path.display().to_string()));

        let metadata = tokio::fs::metadata(path).await.map_err(|_| missing())?;
        if !metadata.is_file() {
            return Err(missing());
        }
        if metadata.len() > *self.config.max_download_bytes() {
            return Err(IngestionError::new(IngestionErrorKind::TooLarge(
                *self.config.max_download_bytes(),
            )));
        }

        let bytes = tokio::fs::read(path).await.map_err(|_| missing())?;

        let file_name = file_name
            .map(str::to_string)
            .or_else(|| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "image".to_string());

        let mime_type = guess_mime(&file_name)
            .or_else(|| guess_mime(path))
            .unwrap_or_else(|| FALLBACK_MIME.to_string());

        Ok(IngestedContent {
            bytes,
            mime_type,
            file_name,
        })
    }

    async fn fetch_remote(&self, raw: &str) -> Result<IngestedContent, IngestionError> {
        let url = parse_url(raw)?;
        let fetched = self.fetcher.fetch(&url).await?;
        let file_name = url_file_name(&url);

        let declared = fetched
            .content_type
            .as_deref()
            .map(mime_essence)
            .filter(|mime| !mime.is_empty() && mime != FALLBACK_MIME);
        let mime_type = declared
            .or_else(|| guess_mime(&file_name))
            .unwrap_or_else(|| FALLBACK_MIME.to_string());

        Ok(IngestedContent {
            bytes: fetched.bytes,
            mime_type,
            file_name,
        })
    }
}
