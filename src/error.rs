//! Domain errors.
//!
//! Every failure the reporting pipeline can hit maps onto one of these
//! variants. None of them are recovered from: the binary reports the error
//! and exits without writing partial output.

use thiserror::Error;

/// Errors raised while loading, aggregating, editing or persisting a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The activity sheet could not be fetched or read.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// A required column is missing or holds no parseable dates.
    #[error("schema error: {0}")]
    Schema(String),

    /// The persisted weekly table is unreadable or malformed.
    #[error("persisted table error: {0}")]
    Persistence(String),

    /// A `--set` edit could not be parsed or targets a read-only column.
    #[error("invalid edit '{edit}': {reason}")]
    InvalidEdit { edit: String, reason: String },
}

impl ReportError {
    pub(crate) fn invalid_edit(edit: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEdit {
            edit: edit.to_string(),
            reason: reason.into(),
        }
    }
}
