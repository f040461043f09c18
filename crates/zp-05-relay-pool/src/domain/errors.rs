//! Relay pool errors.

use shared_types::RelayNotice;
use thiserror::Error;

/// Errors from relay connections and requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Handshake failed.
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// Socket-level failure on an open connection.
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection ended while a request was outstanding.
    #[error("connection closed")]
    ConnectionClosed,

    /// An operation exceeded its deadline.
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// The relay refused an event or ended a subscription.
    #[error(transparent)]
    Rejected(#[from] RelayNotice),

    /// A frame could not be parsed or serialized.
    #[error("invalid relay message: {0}")]
    InvalidMessage(String),

    /// The relay is not connected right now.
    #[error("relay {0} is not connected")]
    NotConnected(String),

    /// The relay exhausted its reconnect attempts.
    #[error("relay {url} given up after {attempts} attempts")]
    GaveUp { url: String, attempts: u32 },

    /// Not one of the configured relays.
    #[error("unknown relay {0}")]
    UnknownRelay(String),

    /// Publishing failed everywhere.
    #[error("no relay accepted event {event_id} ({} failures)", failures.len())]
    NoRelayAccepted {
        event_id: String,
        failures: Vec<(String, String)>,
    },

    /// The pool has been shut down.
    #[error("relay pool is shut down")]
    PoolShutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_is_transparent() {
        let err: RelayError = RelayNotice::EventRejected {
            relay: "wss://r".into(),
            event_id: "e1".into(),
            reason: "blocked".into(),
        }
        .into();
        assert_eq!(err.to_string(), "event e1 rejected by wss://r: blocked");
    }

    #[test]
    fn test_no_relay_accepted_counts_failures() {
        let err = RelayError::NoRelayAccepted {
            event_id: "e1".into(),
            failures: vec![("a".into(), "x".into()), ("b".into(), "y".into())],
        };
        assert_eq!(err.to_string(), "no relay accepted event e1 (2 failures)");
    }
}
