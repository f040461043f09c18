//! Outbound ports (SPI) for history sync.

use async_trait::async_trait;
use shared_types::{Filter, TransportEvent};

use crate::domain::SyncError;

/// Something that answers one-shot stored-event queries, usually a relay.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Identifies the source in logs and reports.
    fn source_id(&self) -> &str;

    /// Stored events matching `filter`, up to end-of-stored-events.
    async fn fetch_page(&self, filter: Filter) -> Result<Vec<TransportEvent>, SyncError>;
}
