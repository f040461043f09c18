//! Publish outcome.

use shared_types::EventId;
use std::time::Duration;

/// Per-relay outcome of publishing one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub event_id: EventId,
    /// Relays that acknowledged the event.
    pub accepted: Vec<String>,
    /// Relays that refused, timed out or were offline, with the reason.
    pub failed: Vec<(String, String)>,
    /// Time until the last relay answered.
    pub elapsed: Duration,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        !self.accepted.is_empty()
    }
}
