//! Relay pool configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::BackoffPolicy;

/// Configuration for the relay pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayPoolConfig {
    /// Relay endpoints (`wss://...`).
    pub relays: Vec<String>,
    /// First reconnect delay.
    pub reconnect_base_ms: u64,
    /// Ceiling for the reconnect delay.
    pub reconnect_max_ms: u64,
    /// Consecutive failures before a relay is given up.
    pub max_reconnect_attempts: u32,
    /// Time allowed for a connection handshake.
    pub connect_timeout_ms: u64,
    /// Time allowed for a query to reach end-of-stored-events.
    pub query_timeout_ms: u64,
    /// Time allowed for a relay to acknowledge a published event.
    pub publish_timeout_ms: u64,
    /// Commands buffered per relay task.
    pub command_buffer: usize,
}

impl Default for RelayPoolConfig {
    fn default() -> Self {
        Self {
            relays: vec![
                "wss://relay.nostr.band".to_string(),
                "wss://relay.primal.net".to_string(),
            ],
            reconnect_base_ms: 5_000,
            reconnect_max_ms: 30_000,
            max_reconnect_attempts: 10,
            connect_timeout_ms: 10_000,
            query_timeout_ms: 15_000,
            publish_timeout_ms: 10_000,
            command_buffer: 64,
        }
    }
}

impl RelayPoolConfig {
    /// Two fake relays and fast timings.
    pub fn for_testing() -> Self {
        Self {
            relays: vec![
                "wss://relay-a.test".to_string(),
                "wss://relay-b.test".to_string(),
            ],
            reconnect_base_ms: 10,
            reconnect_max_ms: 100,
            max_reconnect_attempts: 3,
            connect_timeout_ms: 1_000,
            query_timeout_ms: 1_000,
            publish_timeout_ms: 1_000,
            command_buffer: 16,
        }
    }

    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            Duration::from_millis(self.reconnect_base_ms),
            Duration::from_millis(self.reconnect_max_ms),
            self.max_reconnect_attempts,
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}
