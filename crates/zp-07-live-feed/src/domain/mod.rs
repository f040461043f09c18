//! Live feed domain.

mod errors;
mod filter;

pub use errors::LiveFeedError;
pub use filter::live_filter;
