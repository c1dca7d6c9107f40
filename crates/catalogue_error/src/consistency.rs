//! Consistency fault types.
//!
//! A fault means persisted state broke the ordering or cover invariant outside
//! of an in-flight mutation. Faults are logged and repaired, never left in place.

/// Invariant violations detected in a persisted collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ConsistencyFaultKind {
    /// Two or more items share a position
    #[display("Position {} held by {} items", position, count)]
    DuplicatePosition {
        /// The shared position
        position: u32,
        /// How many items hold it
        count: usize,
    },
    /// Positions are not the contiguous range `0..n`
    #[display("Positions are not contiguous: expected {}, found {}", expected, found)]
    PositionGap {
        /// Position expected at this rank
        expected: u32,
        /// Position actually found
        found: u32,
    },
    /// More than one item is flagged as cover
    #[display("{} items flagged as cover", _0)]
    MultipleCovers(usize),
    /// A non-empty collection has no cover
    #[display("Non-empty collection has no cover")]
    MissingCover,
}

/// Consistency fault with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Consistency Fault: {} at line {} in {}", kind, line, file)]
pub struct ConsistencyFault {
    /// The kind of fault detected
    pub kind: ConsistencyFaultKind,
    /// Line number where the fault was raised
    pub line: u32,
    /// File where the fault was raised
    pub file: &'static str,
}

impl ConsistencyFault {
    /// Create a new fault with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConsistencyFaultKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the fault kind.
    pub fn kind(&self) -> &ConsistencyFaultKind {
        &self.kind
    }
}
