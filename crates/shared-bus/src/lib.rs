//! # Shared Bus - Event Channels Between Components
//!
//! Two channels connect the client's components:
//!
//! ```text
//! ┌──────────────┐  InboundEvent   ┌──────────────┐  CellChange   ┌──────────────┐
//! │ Relay tasks  │ ──────────────▶ │  Dispatcher  │ ────────────▶ │  Observers   │
//! │ (one/relay)  │   mpsc fan-in   │  + pipeline  │   broadcast   │  (UI, logs)  │
//! └──────────────┘                 └──────────────┘               └──────────────┘
//! ```
//!
//! - The inbound channel is bounded. A slow pipeline back-pressures the relay
//!   tasks instead of growing memory without limit.
//! - The change feed is a broadcast. Lagging observers miss changes, the
//!   canvas itself never waits on them.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventTopic, InboundEvent, Origin};
pub use publisher::{inbound_channel, EventPublisher, InboundSender};
pub use subscriber::{ChangeFeed, ChangeSink, InboundReceiver, NullSink, RecordingSink};

/// Inbound events buffered before relay tasks are back-pressured.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Cell changes buffered per observer before it starts lagging.
pub const DEFAULT_FEED_CAPACITY: usize = 4096;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
        assert!(DEFAULT_FEED_CAPACITY >= DEFAULT_CHANNEL_CAPACITY);
    }
}
