//! Top-level error wrapper types.

use crate::{
    ConfigError, ConsistencyFault, IngestionError, NotFoundError, OrderingError, RepositoryError,
    StorageError,
};

/// Every error the catalogue crates can produce.
///
/// # Examples
///
/// ```
/// use catalogue_error::{CatalogueError, NotFoundError};
///
/// let err: CatalogueError = NotFoundError::new("abc").into();
/// assert!(format!("{}", err).contains("Not Found"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CatalogueErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Binary storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Record persistence error
    #[from(RepositoryError)]
    Repository(RepositoryError),
    /// Item could not be ingested
    #[from(IngestionError)]
    Ingestion(IngestionError),
    /// Reorder request rejected
    #[from(OrderingError)]
    Ordering(OrderingError),
    /// Identifier did not resolve
    #[from(NotFoundError)]
    NotFound(NotFoundError),
    /// Persisted state broke an invariant
    #[from(ConsistencyFault)]
    Consistency(ConsistencyFault),
}

/// Catalogue error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Catalogue Error: {}", _0)]
pub struct CatalogueError(Box<CatalogueErrorKind>);

impl CatalogueError {
    /// Create a new error from a kind.
    pub fn new(kind: CatalogueErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CatalogueErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to CatalogueErrorKind
impl<T> From<T> for CatalogueError
where
    T: Into<CatalogueErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for catalogue operations.
pub type CatalogueResult<T> = std::result::Result<T, CatalogueError>;
