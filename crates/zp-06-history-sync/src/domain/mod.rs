//! History sync domain.

mod errors;
mod report;

pub use errors::SyncError;
pub use report::{PaginationReport, StopReason, SyncOutcome};
