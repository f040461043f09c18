//! History sync configuration.

use serde::{Deserialize, Serialize};
use shared_types::{Filter, Timestamp, DEFAULT_SINCE_FLOOR, KIND_PAYMENT_RECEIPT, KIND_PLACEMENT};
use std::time::Duration;

/// Configuration for historical backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Events requested per page.
    pub page_size: usize,
    /// Pause between pages of the same relay.
    pub request_delay_ms: u64,
    /// Events at or before this timestamp are never fetched.
    pub since_floor: Timestamp,
    /// Time allowed for a single page.
    pub page_timeout_ms: u64,
    /// Event kinds to backfill.
    pub kinds: Vec<u32>,
    /// Canvas pubkey the events must tag. `None` fetches every tagged kind.
    pub target: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            request_delay_ms: 1_000,
            since_floor: DEFAULT_SINCE_FLOOR,
            page_timeout_ms: 15_000,
            kinds: vec![KIND_PLACEMENT, KIND_PAYMENT_RECEIPT],
            target: None,
        }
    }
}

impl SyncConfig {
    /// Small pages, no floor and no delay.
    pub fn for_testing() -> Self {
        Self {
            page_size: 3,
            request_delay_ms: 10,
            since_floor: 0,
            page_timeout_ms: 1_000,
            ..Self::default()
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    /// Filter for the page ending at `until`.
    pub fn page_filter(&self, until: Timestamp) -> Filter {
        let mut filter = Filter::new()
            .kinds(self.kinds.iter().copied())
            .until(until)
            .limit(self.page_size);
        if let Some(target) = &self.target {
            filter = filter.p_tag(target.clone());
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.request_delay(), Duration::from_secs(1));
        assert_eq!(config.since_floor, 1_751_821_200);
        assert_eq!(config.kinds, vec![90001, 9735]);
    }

    #[test]
    fn test_page_filter_carries_cursor_and_target() {
        let config = SyncConfig {
            target: Some("cafe".into()),
            ..SyncConfig::default()
        };
        let filter = config.page_filter(500);
        assert_eq!(filter.until, Some(500));
        assert_eq!(filter.limit, Some(100));
        assert_eq!(filter.p_tags, Some(vec!["cafe".to_string()]));
        assert_eq!(filter.since, None);
    }
}
