//! # ZP-07 Live Feed
//!
//! Keeps one standing subscription for new canvas events open on every
//! relay for the lifetime of the client.
//!
//! When a relay ends the subscription with `CLOSED`, it is re-issued on that
//! relay straight away. There is no retry cap: a live canvas has no useful
//! "gave up" state. Restarts ask for events from a little before the restart
//! so nothing published during the gap is missed; duplicates are dropped
//! downstream.

#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod testing;

// Re-exports
pub use config::LiveFeedConfig;
pub use domain::{live_filter, LiveFeedError};
pub use ports::SubscriptionPort;
pub use service::LiveSubscriber;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
