//! Multi-relay backfill.

use std::sync::Arc;

use futures::future::join_all;
use shared_types::{Timestamp, TransportEvent};
use tracing::{debug, info, warn};

use crate::algorithms::{merge_chronological, next_step, scan_page, PageDecision};
use crate::config::SyncConfig;
use crate::domain::{PaginationReport, StopReason, SyncError, SyncOutcome};
use crate::ports::HistorySource;

/// Walks every source backwards from a starting cursor down to the floor.
#[derive(Debug, Clone, Default)]
pub struct HistoricalSync {
    config: SyncConfig,
}

impl HistoricalSync {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Backfills from every source concurrently.
    ///
    /// A failing source only ends its own walk. The sync fails when there
    /// are no sources, or when every source failed.
    pub async fn sync(
        &self,
        sources: &[Arc<dyn HistorySource>],
        until: Timestamp,
    ) -> Result<SyncOutcome, SyncError> {
        if sources.is_empty() {
            return Err(SyncError::NoSources);
        }

        let runs = join_all(
            sources
                .iter()
                .map(|source| self.paginate(source.as_ref(), until)),
        )
        .await;

        let mut buffers = Vec::with_capacity(runs.len());
        let mut reports = Vec::with_capacity(runs.len());
        for (events, report) in runs {
            buffers.push(events);
            reports.push(report);
        }

        if reports.iter().all(|r| r.stop.is_failure()) {
            let failures = reports
                .into_iter()
                .filter_map(|r| match r.stop {
                    StopReason::SourceFailed(reason) => Some((r.source, reason)),
                    _ => None,
                })
                .collect();
            return Err(SyncError::AllSourcesFailed { failures });
        }

        let events = merge_chronological(buffers);
        info!(
            sources = reports.len(),
            events = events.len(),
            "Historical sync complete"
        );
        Ok(SyncOutcome { events, reports })
    }

    /// Walks one source. Events come back in fetch order; use
    /// [`merge_chronological`] before applying them.
    pub async fn paginate(
        &self,
        source: &dyn HistorySource,
        until: Timestamp,
    ) -> (Vec<TransportEvent>, PaginationReport) {
        let floor = self.config.since_floor;
        let mut cursor = until;
        let mut buffered: Vec<TransportEvent> = Vec::new();
        let mut pages = 0u32;
        let mut oldest: Option<Timestamp> = None;

        let stop = loop {
            if pages > 0 {
                tokio::time::sleep(self.config.request_delay()).await;
            }

            let filter = self.config.page_filter(cursor);
            let page =
                match tokio::time::timeout(self.config.page_timeout(), source.fetch_page(filter))
                    .await
                {
                    Ok(Ok(page)) => page,
                    Ok(Err(e)) => break StopReason::SourceFailed(e.to_string()),
                    Err(_) => {
                        break StopReason::SourceFailed(
                            SyncError::Timeout {
                                source_id: source.source_id().to_string(),
                            }
                            .to_string(),
                        )
                    }
                };
            pages += 1;

            let received = page.len();
            let scan = scan_page(page, floor);
            debug!(
                source = source.source_id(),
                page = pages,
                until = cursor,
                received,
                kept = scan.kept.len(),
                "History page fetched"
            );
            if let Some(page_oldest) = scan.oldest {
                oldest = Some(oldest.map_or(page_oldest, |o| o.min(page_oldest)));
            }
            buffered.extend(scan.kept);

            match next_step(cursor, scan.oldest, floor) {
                PageDecision::Continue { until } => cursor = until,
                PageDecision::Stop(reason) => break reason,
            }
        };

        if let StopReason::SourceFailed(reason) = &stop {
            warn!(source = source.source_id(), pages, %reason, "History source failed");
        } else {
            debug!(source = source.source_id(), pages, stop = ?stop, "History walk finished");
        }

        let report = PaginationReport {
            source: source.source_id().to_string(),
            pages,
            events: buffered.len(),
            oldest,
            stop,
        };
        (buffered, report)
    }
}
