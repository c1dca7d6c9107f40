//! Not-found error types.

/// A media item identifier that did not resolve within its collection.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Not Found: {} at line {} in {}", identifier, line, file)]
pub struct NotFoundError {
    /// The identifier that was looked up
    pub identifier: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl NotFoundError {
    /// Create a new NotFoundError for the given identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalogue_error::NotFoundError;
    ///
    /// let err = NotFoundError::new("7d1c");
    /// assert_eq!(err.identifier, "7d1c");
    /// ```
    #[track_caller]
    pub fn new(identifier: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            identifier: identifier.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
