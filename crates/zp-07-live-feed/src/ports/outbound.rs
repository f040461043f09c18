//! Outbound ports (SPI) for the live feed.

use async_trait::async_trait;
use shared_types::Filter;

use crate::domain::LiveFeedError;

/// Opens and closes standing subscriptions on relays.
#[async_trait]
pub trait SubscriptionPort: Send + Sync {
    /// Opens `subscription_id` on one relay, or on all when `relay` is
    /// `None`. Opening an id that is already open replaces its filters.
    async fn open(
        &self,
        relay: Option<&str>,
        subscription_id: &str,
        filters: Vec<Filter>,
    ) -> Result<(), LiveFeedError>;

    /// Closes `subscription_id` everywhere.
    async fn close(&self, subscription_id: &str) -> Result<(), LiveFeedError>;
}
