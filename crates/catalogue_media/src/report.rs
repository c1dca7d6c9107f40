//! Outcome summaries returned by every mutating operation.
//!
//! Callers see counts and a bounded list of failed sources, never raw
//! internal errors.

use catalogue_core::MediaItemView;
use catalogue_error::{IngestionError, IngestionErrorKind};
use serde::Serialize;

/// Which mutation produced a report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::EnumIter, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Local files ingested
    #[display("upload files")]
    UploadFiles,
    /// Remote URLs ingested
    #[display("upload from URLs")]
    AddUrls,
    /// Name/description edited
    #[display("edit item")]
    Update,
    /// Cover moved
    #[display("set cover")]
    SetCover,
    /// Item deleted
    #[display("delete item")]
    Remove,
    /// Full order applied
    #[display("reorder")]
    Reorder,
    /// Single item moved
    #[display("move")]
    Move,
    /// Whole client state saved
    #[display("commit")]
    Commit,
    /// Collection deleted with its owner
    #[display("purge")]
    Purge,
}

impl Operation {
    fn success_message(self, count: usize) -> String {
        match self {
            Self::UploadFiles => format!("{} image(s) uploaded successfully", count),
            Self::AddUrls => format!("{} image(s) added successfully", count),
            Self::Update => "Image details updated".to_string(),
            Self::SetCover => "Cover image updated".to_string(),
            Self::Remove => "Image deleted".to_string(),
            Self::Reorder | Self::Move => "Image order updated".to_string(),
            Self::Commit => "Images saved".to_string(),
            Self::Purge => format!("{} image(s) deleted", count),
        }
    }

    fn failure_heading(self) -> (&'static str, &'static str) {
        match self {
            Self::AddUrls => ("Some URLs failed", "Failed URLs"),
            Self::UploadFiles => ("Some files failed", "Failed files"),
            _ => ("Some items failed", "Failed items"),
        }
    }
}

/// One source that could not be ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Path or URL as submitted
    pub locator: String,
    /// Human-readable reason
    pub reason: String,
    /// Failure category
    #[serde(skip)]
    pub kind: IngestionErrorKind,
}

impl ItemFailure {
    /// Record `error` against `locator`.
    pub fn new(locator: impl Into<String>, error: &IngestionError) -> Self {
        Self {
            locator: locator.into(),
            reason: error.kind.to_string(),
            kind: error.kind.clone(),
        }
    }
}

/// Result of one mutating operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationReport {
    /// What ran
    pub operation: Operation,
    /// Items affected successfully
    pub succeeded: usize,
    /// Per-source ingestion failures, in submission order
    pub failures: Vec<ItemFailure>,
    /// Non-fatal notices such as unresolved identifiers
    pub warnings: Vec<String>,
    /// Collection state after the operation, in display order
    pub items: Vec<MediaItemView>,
    #[serde(skip)]
    failure_report_limit: usize,
}

impl OperationReport {
    /// Empty report that names at most `failure_report_limit` failures in its summary.
    pub fn new(operation: Operation, failure_report_limit: usize) -> Self {
        Self {
            operation,
            succeeded: 0,
            failures: Vec::new(),
            warnings: Vec::new(),
            items: Vec::new(),
            failure_report_limit,
        }
    }

    /// Count one success.
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    /// Record a failed source.
    pub fn record_failure(&mut self, locator: impl Into<String>, error: &IngestionError) {
        self.failures.push(ItemFailure::new(locator, error));
    }

    /// Record a non-fatal notice.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// True when nothing failed and nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }

    /// Failure line naming the first few locators and counting the rest.
    fn failure_line(&self) -> String {
        let (title, label) = self.operation.failure_heading();
        let shown: Vec<&str> = self
            .failures
            .iter()
            .take(self.failure_report_limit)
            .map(|failure| failure.locator.as_str())
            .collect();
        let mut line = format!("{}. {}: {}", title, label, shown.join(", "));
        let hidden = self.failures.len().saturating_sub(self.failure_report_limit);
        if hidden > 0 {
            line.push_str(&format!(" and {} more", hidden));
        }
        line
    }

    /// Lines to show the user.
    ///
    /// ```
    /// use catalogue_media::{Operation, OperationReport};
    ///
    /// let mut report = OperationReport::new(Operation::AddUrls, 3);
    /// report.record_success();
    /// assert_eq!(report.summary(), vec!["1 image(s) added successfully"]);
    /// ```
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.succeeded > 0 {
            lines.push(self.operation.success_message(self.succeeded));
        }
        if !self.failures.is_empty() {
            lines.push(self.failure_line());
        }
        lines.extend(self.warnings.iter().cloned());
        lines
    }
}
