//! # Inbound Events
//!
//! Typed notifications produced by relay tasks. Events whose kind is not
//! part of the canvas protocol never make it onto the bus.

use shared_types::{
    RelayRecord, TransportEvent, KIND_PAYMENT_RECEIPT, KIND_PLACEMENT,
};

/// Where an event entered the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Paginated replay at startup.
    History,
    /// The long-lived subscription.
    Live,
    /// Submitted by this client.
    Local,
}

/// Topic used for logging and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    Placement,
    Receipt,
    Subscription,
    RelayStatus,
}

impl EventTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventTopic::Placement => "placement",
            EventTopic::Receipt => "receipt",
            EventTopic::Subscription => "subscription",
            EventTopic::RelayStatus => "relay_status",
        }
    }
}

/// Everything relay tasks report to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    PlacementReceived {
        relay: String,
        origin: Origin,
        event: TransportEvent,
    },
    ReceiptReceived {
        relay: String,
        origin: Origin,
        event: TransportEvent,
    },
    /// A relay ended a subscription it had accepted.
    SubscriptionClosed {
        relay: String,
        subscription_id: String,
        reason: String,
    },
    RelayStatusChanged(RelayRecord),
}

impl InboundEvent {
    /// Classifies a relay-delivered event by kind. Unknown kinds yield `None`.
    pub fn from_relay(relay: &str, origin: Origin, event: TransportEvent) -> Option<Self> {
        let relay = relay.to_string();
        match event.kind {
            KIND_PLACEMENT => Some(Self::PlacementReceived {
                relay,
                origin,
                event,
            }),
            KIND_PAYMENT_RECEIPT => Some(Self::ReceiptReceived {
                relay,
                origin,
                event,
            }),
            _ => None,
        }
    }

    pub fn topic(&self) -> EventTopic {
        match self {
            Self::PlacementReceived { .. } => EventTopic::Placement,
            Self::ReceiptReceived { .. } => EventTopic::Receipt,
            Self::SubscriptionClosed { .. } => EventTopic::Subscription,
            Self::RelayStatusChanged(_) => EventTopic::RelayStatus,
        }
    }

    /// Relay the event came from.
    pub fn relay(&self) -> &str {
        match self {
            Self::PlacementReceived { relay, .. }
            | Self::ReceiptReceived { relay, .. }
            | Self::SubscriptionClosed { relay, .. } => relay,
            Self::RelayStatusChanged(record) => &record.url,
        }
    }
}
