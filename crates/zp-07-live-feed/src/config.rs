//! Live feed configuration.

use serde::{Deserialize, Serialize};
use shared_types::{KIND_PAYMENT_RECEIPT, KIND_PLACEMENT};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveFeedConfig {
    /// Subscription id used on every relay.
    pub subscription_id: String,
    pub kinds: Vec<u32>,
    /// Canvas pubkey the events must tag.
    pub target: Option<String>,
    /// How far before a restart the re-issued subscription reaches back.
    pub restart_overlap_secs: u64,
    /// Pause before re-issuing a closed subscription.
    pub restart_delay_ms: u64,
}

impl Default for LiveFeedConfig {
    fn default() -> Self {
        Self {
            subscription_id: "zp-live".to_string(),
            kinds: vec![KIND_PLACEMENT, KIND_PAYMENT_RECEIPT],
            target: None,
            restart_overlap_secs: 60,
            restart_delay_ms: 0,
        }
    }
}

impl LiveFeedConfig {
    pub fn for_testing() -> Self {
        Self {
            subscription_id: "test-live".to_string(),
            restart_delay_ms: 5,
            ..Self::default()
        }
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}
