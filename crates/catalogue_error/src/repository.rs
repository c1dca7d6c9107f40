//! Repository error types.

/// Repository error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RepositoryErrorKind {
    /// Reading or writing the backing store failed
    #[display("Repository I/O error: {}", _0)]
    Io(String),
    /// Record could not be encoded or decoded
    #[display("Serialization error: {}", _0)]
    Serialization(String),
    /// A record file holds a different collection than the one requested
    #[display("Record for {} found where {} was expected", found, expected)]
    ScopeMismatch {
        /// Scope that was requested
        expected: String,
        /// Scope stored in the record
        found: String,
    },
}

/// Repository error with source location tracking.
///
/// # Examples
///
/// ```
/// use catalogue_error::{RepositoryError, RepositoryErrorKind};
///
/// let err = RepositoryError::new(RepositoryErrorKind::Io("disk full".into()));
/// assert!(format!("{}", err).contains("disk full"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Repository Error: {} at line {} in {}", kind, line, file)]
pub struct RepositoryError {
    /// The kind of error that occurred
    pub kind: RepositoryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RepositoryError {
    /// Create a new RepositoryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RepositoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for RepositoryError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::new(RepositoryErrorKind::Serialization(err.to_string()))
    }
}

impl From<std::io::Error> for RepositoryError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        RepositoryError::new(RepositoryErrorKind::Io(err.to_string()))
    }
}
