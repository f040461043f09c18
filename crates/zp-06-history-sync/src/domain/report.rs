//! Pagination outcomes.

use shared_types::{Timestamp, TransportEvent};

/// Why a relay's pagination ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// No event newer than the floor came back.
    EmptyPage,
    /// The cursor would not move backwards.
    NoProgress,
    /// The walk reached the floor timestamp.
    ReachedFloor,
    /// The source errored or timed out.
    SourceFailed(String),
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::SourceFailed(_))
    }
}

/// Summary of one relay's walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationReport {
    pub source: String,
    /// Pages that completed.
    pub pages: u32,
    /// Events buffered from this source, before cross-source dedup.
    pub events: usize,
    /// Oldest timestamp buffered.
    pub oldest: Option<Timestamp>,
    pub stop: StopReason,
}

/// Result of a multi-relay sync.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    /// Unique events, ascending by `(created_at, id)`.
    pub events: Vec<TransportEvent>,
    pub reports: Vec<PaginationReport>,
}

impl SyncOutcome {
    pub fn failed_sources(&self) -> impl Iterator<Item = &PaginationReport> {
        self.reports.iter().filter(|r| r.stop.is_failure())
    }
}
