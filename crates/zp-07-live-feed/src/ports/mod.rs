//! Ports for the live feed.

pub mod outbound;

pub use outbound::SubscriptionPort;
