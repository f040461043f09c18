use thiserror::Error;

/// Errors from the live feed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiveFeedError {
    /// The subscription could not be opened or closed.
    #[error("subscription failed: {0}")]
    Subscribe(String),

    /// `start` has not been called, or `stop` already was.
    #[error("live feed is not running")]
    NotStarted,
}
