//! History sync errors.

use thiserror::Error;

/// Errors from backfilling history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A source failed to deliver a page.
    #[error("history source {source_id} failed: {reason}")]
    Source { source_id: String, reason: String },

    /// A page did not complete in time.
    #[error("history page from {source_id} timed out")]
    Timeout { source_id: String },

    /// Nothing to sync from.
    #[error("no history sources available")]
    NoSources,

    /// Every source failed before delivering a page.
    #[error("all {} history sources failed", failures.len())]
    AllSourcesFailed { failures: Vec<(String, String)> },
}
