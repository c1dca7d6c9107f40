//! Ordering error types.

/// Reasons a reorder request was rejected.
///
/// A rejected reorder is never partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum OrderingErrorKind {
    /// The sequence names an item that is not in the collection
    #[display("Unknown identifier in reorder request: {}", _0)]
    UnknownIdentifier(String),
    /// The sequence omits an item of the collection
    #[display("Reorder request omits identifier: {}", _0)]
    MissingIdentifier(String),
    /// The sequence names the same item twice
    #[display("Identifier appears more than once: {}", _0)]
    DuplicateIdentifier(String),
    /// A move index lies outside the collection
    #[display("Index {} out of range for {} item(s)", index, len)]
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Collection size
        len: usize,
    },
}

/// Ordering error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ordering Error: {} at line {} in {}", kind, line, file)]
pub struct OrderingError {
    /// The kind of error that occurred
    pub kind: OrderingErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl OrderingError {
    /// Create a new ordering error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: OrderingErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &OrderingErrorKind {
        &self.kind
    }
}
