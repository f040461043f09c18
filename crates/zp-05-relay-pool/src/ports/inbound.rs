//! Inbound port (API) offered by the relay pool.

use async_trait::async_trait;
use shared_types::{Filter, RelayRecord, TransportEvent};

use crate::domain::{PublishReport, RelayError};

/// What the rest of the client may ask of the relays.
#[async_trait]
pub trait RelayPoolApi: Send + Sync {
    /// Configured relay URLs in configuration order.
    fn relay_urls(&self) -> Vec<String>;

    /// Snapshot of every relay's connection state.
    fn statuses(&self) -> Vec<RelayRecord>;

    /// Opens a long-lived subscription on one relay, or on all of them when
    /// `relay` is `None`. Events arrive on the inbound bus. The subscription
    /// is re-issued after reconnects until unsubscribed.
    async fn subscribe(
        &self,
        relay: Option<&str>,
        subscription_id: &str,
        filters: Vec<Filter>,
    ) -> Result<(), RelayError>;

    /// Ends a subscription everywhere.
    async fn unsubscribe(&self, subscription_id: &str) -> Result<(), RelayError>;

    /// Fetches stored events from one relay up to end-of-stored-events.
    async fn query(&self, relay: &str, filters: Vec<Filter>)
        -> Result<Vec<TransportEvent>, RelayError>;

    /// Sends an event to every relay at once. Succeeds if any accepts.
    async fn publish(&self, event: &TransportEvent) -> Result<PublishReport, RelayError>;
}
