//! Relay pool domain.

mod backoff;
mod errors;
mod messages;
mod report;

pub use backoff::BackoffPolicy;
pub use errors::RelayError;
pub use messages::{ClientMessage, RelayMessage};
pub use report::PublishReport;
