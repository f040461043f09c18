//! # ZP-06 History Sync
//!
//! Backfills the canvas before live delivery starts.
//!
//! ## Pagination
//!
//! Each relay is walked backwards in time with an `until` cursor:
//!
//! ```text
//! until = now
//! loop:
//!     page   = REQ {kinds, #p, until, limit}
//!     kept   = events with created_at > floor
//!     oldest = min(kept.created_at)
//!     stop if kept is empty             (EmptyPage)
//!     next   = oldest - 1
//!     stop if next >= until             (NoProgress)
//!     stop if next <= floor             (ReachedFloor)
//!     until  = next, sleep(request_delay)
//! ```
//!
//! A short page does not end the walk: relays may cap `limit` below what was
//! asked. Relays are walked concurrently, then the buffers are merged,
//! de-duplicated by id and sorted ascending by `(created_at, id)` so the
//! canvas sees older writes first.
//!
//! ## Module Structure
//!
//! ```text
//! zp-06-history-sync/
//! ├── domain/          # SyncError, PaginationReport, StopReason
//! ├── algorithms/      # Page scanning and cursor decisions
//! ├── ports/           # HistorySource (outbound)
//! ├── service/         # HistoricalSync
//! ├── testing.rs       # MockHistorySource
//! └── config.rs        # SyncConfig
//! ```

#![warn(clippy::all)]

pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod testing;

// Re-exports
pub use algorithms::{merge_chronological, next_step, scan_page, PageDecision, PageScan};
pub use config::SyncConfig;
pub use domain::{PaginationReport, StopReason, SyncError, SyncOutcome};
pub use ports::HistorySource;
pub use service::HistoricalSync;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
