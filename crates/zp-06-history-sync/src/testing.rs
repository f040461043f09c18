//! In-memory history source for tests.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Filter, TransportEvent};

use crate::domain::SyncError;
use crate::ports::HistorySource;

/// Serves pages from a fixed event list, newest first.
pub struct MockHistorySource {
    id: String,
    events: Vec<TransportEvent>,
    page_cap: Option<usize>,
    ignore_until: bool,
    fail_after: Option<usize>,
    latency: Option<Duration>,
    requests: Mutex<Vec<Filter>>,
}

impl MockHistorySource {
    pub fn new(id: &str, events: Vec<TransportEvent>) -> Self {
        Self {
            id: id.to_string(),
            events,
            page_cap: None,
            ignore_until: false,
            fail_after: None,
            latency: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns at most `cap` events per page regardless of `limit`.
    pub fn with_page_cap(mut self, cap: usize) -> Self {
        self.page_cap = Some(cap);
        self
    }

    /// Behaves like a relay that ignores the `until` bound.
    pub fn ignoring_until(mut self) -> Self {
        self.ignore_until = true;
        self
    }

    /// Serves `pages` pages, then errors on every request.
    pub fn failing_after(mut self, pages: usize) -> Self {
        self.fail_after = Some(pages);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Filters received so far.
    pub fn requests(&self) -> Vec<Filter> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HistorySource for MockHistorySource {
    fn source_id(&self) -> &str {
        &self.id
    }

    async fn fetch_page(&self, filter: Filter) -> Result<Vec<TransportEvent>, SyncError> {
        let served = {
            let mut requests = self.requests.lock();
            requests.push(filter.clone());
            requests.len() - 1
        };
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_after.is_some_and(|limit| served >= limit) {
            return Err(SyncError::Source {
                source_id: self.id.clone(),
                reason: "connection reset".to_string(),
            });
        }

        let mut effective = filter.clone();
        if self.ignore_until {
            effective.until = None;
        }
        let mut page: Vec<TransportEvent> = self
            .events
            .iter()
            .filter(|e| effective.matches(e))
            .cloned()
            .collect();
        page.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let limit = filter.limit.unwrap_or(usize::MAX);
        page.truncate(self.page_cap.map_or(limit, |cap| cap.min(limit)));
        Ok(page)
    }
}
