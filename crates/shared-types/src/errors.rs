//! # Error Types
//!
//! Errors shared across crates that do not belong to a single component.

use thiserror::Error;

/// Rejections of a subscription or publish reported by a relay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayNotice {
    /// The relay refused an event (OK with `false`).
    #[error("event {event_id} rejected by {relay}: {reason}")]
    EventRejected {
        relay: String,
        event_id: String,
        reason: String,
    },

    /// The relay ended a subscription on its own.
    #[error("subscription {subscription_id} closed by {relay}: {reason}")]
    SubscriptionClosed {
        relay: String,
        subscription_id: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_display() {
        let notice = RelayNotice::SubscriptionClosed {
            relay: "wss://r".into(),
            subscription_id: "live".into(),
            reason: "rate-limited".into(),
        };
        assert_eq!(
            notice.to_string(),
            "subscription live closed by wss://r: rate-limited"
        );
    }
}
