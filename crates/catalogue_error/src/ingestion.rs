//! Ingestion error types.
//!
//! Ingestion failures are per item: a batch upload records them in its report
//! and carries on with the next source.

/// Reasons an item could not be ingested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum IngestionErrorKind {
    /// The locator does not parse as an absolute URL
    #[display("Invalid URL: {}", _0)]
    InvalidUrl(String),
    /// The URL parses but uses a scheme other than http/https
    #[display("Unsupported URL scheme: {}", _0)]
    UnsupportedScheme(String),
    /// Connection or transfer failed
    #[display("Unreachable: {}", _0)]
    Unreachable(String),
    /// The fetch exceeded the configured timeout
    #[display("Timed out after {}s: {}", seconds, url)]
    Timeout {
        /// URL being fetched
        url: String,
        /// Configured timeout
        seconds: u64,
    },
    /// Remote answered with a non-success status
    #[display("HTTP {} from {}", status, url)]
    HttpStatus {
        /// URL being fetched
        url: String,
        /// Status code returned
        status: u16,
    },
    /// The local temporary file is gone
    #[display("Missing local file: {}", _0)]
    MissingFile(String),
    /// MIME type outside the accepted list
    #[display("Unsupported MIME type: {}", _0)]
    UnsupportedMimeType(String),
    /// Body larger than the configured limit
    #[display("Content exceeds {} bytes", _0)]
    TooLarge(u64),
    /// Bytes were fetched but could not be written
    #[display("Storage failed: {}", _0)]
    Storage(String),
}

/// Ingestion error with location tracking.
///
/// # Examples
///
/// ```
/// use catalogue_error::{IngestionError, IngestionErrorKind};
///
/// let err = IngestionError::new(IngestionErrorKind::MissingFile("/tmp/upload-1".into()));
/// assert!(format!("{}", err).contains("/tmp/upload-1"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ingestion Error: {} at line {} in {}", kind, line, file)]
pub struct IngestionError {
    /// The kind of error that occurred
    pub kind: IngestionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl IngestionError {
    /// Create a new ingestion error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: IngestionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &IngestionErrorKind {
        &self.kind
    }
}
