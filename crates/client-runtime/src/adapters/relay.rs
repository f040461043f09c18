//! Relay pool seen through the history and live feed ports.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{Filter, TransportEvent};
use zp_05_relay_pool::RelayPoolApi;
use zp_06_history_sync::{HistorySource, SyncError};
use zp_07_live_feed::{LiveFeedError, SubscriptionPort};

/// One relay of the pool as a history source.
pub struct RelayHistorySource {
    pool: Arc<dyn RelayPoolApi>,
    url: String,
}

impl RelayHistorySource {
    pub fn new(pool: Arc<dyn RelayPoolApi>, url: impl Into<String>) -> Self {
        Self {
            pool,
            url: url.into(),
        }
    }

    /// One source per relay URL.
    pub fn for_relays(pool: &Arc<dyn RelayPoolApi>, urls: &[String]) -> Vec<Arc<dyn HistorySource>> {
        urls.iter()
            .map(|url| Arc::new(Self::new(Arc::clone(pool), url.clone())) as Arc<dyn HistorySource>)
            .collect()
    }
}

#[async_trait]
impl HistorySource for RelayHistorySource {
    fn source_id(&self) -> &str {
        &self.url
    }

    async fn fetch_page(&self, filter: Filter) -> Result<Vec<TransportEvent>, SyncError> {
        self.pool
            .query(&self.url, vec![filter])
            .await
            .map_err(|e| SyncError::Source {
                source_id: self.url.clone(),
                reason: e.to_string(),
            })
    }
}

/// Live subscriptions opened through the pool.
pub struct PoolSubscriptionPort {
    pool: Arc<dyn RelayPoolApi>,
}

impl PoolSubscriptionPort {
    pub fn new(pool: Arc<dyn RelayPoolApi>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionPort for PoolSubscriptionPort {
    async fn open(
        &self,
        relay: Option<&str>,
        subscription_id: &str,
        filters: Vec<Filter>,
    ) -> Result<(), LiveFeedError> {
        self.pool
            .subscribe(relay, subscription_id, filters)
            .await
            .map_err(|e| LiveFeedError::Subscribe(e.to_string()))
    }

    async fn close(&self, subscription_id: &str) -> Result<(), LiveFeedError> {
        self.pool
            .unsubscribe(subscription_id)
            .await
            .map_err(|e| LiveFeedError::Subscribe(e.to_string()))
    }
}
