//! Cursor arithmetic for backwards pagination.

use std::collections::HashSet;

use shared_types::{Timestamp, TransportEvent};

use crate::domain::StopReason;

/// Events of one page that are newer than the floor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageScan {
    pub kept: Vec<TransportEvent>,
    pub oldest: Option<Timestamp>,
}

/// What to do after a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDecision {
    Continue { until: Timestamp },
    Stop(StopReason),
}

/// Drops events at or before `floor` and finds the oldest survivor.
pub fn scan_page(events: Vec<TransportEvent>, floor: Timestamp) -> PageScan {
    let kept: Vec<TransportEvent> = events
        .into_iter()
        .filter(|e| e.created_at > floor)
        .collect();
    let oldest = kept.iter().map(|e| e.created_at).min();
    PageScan { kept, oldest }
}

/// Decides the next cursor from the page that was fetched with `until`.
pub fn next_step(until: Timestamp, oldest: Option<Timestamp>, floor: Timestamp) -> PageDecision {
    let Some(oldest) = oldest else {
        return PageDecision::Stop(StopReason::EmptyPage);
    };
    let next = oldest.saturating_sub(1);
    if next >= until {
        return PageDecision::Stop(StopReason::NoProgress);
    }
    if next <= floor {
        return PageDecision::Stop(StopReason::ReachedFloor);
    }
    PageDecision::Continue { until: next }
}

/// Merges per-source buffers into one ascending, duplicate-free list.
///
/// Ties on `created_at` are broken by id so the order is deterministic.
pub fn merge_chronological(buffers: Vec<Vec<TransportEvent>>) -> Vec<TransportEvent> {
    let mut seen = HashSet::new();
    let mut merged: Vec<TransportEvent> = buffers
        .into_iter()
        .flatten()
        .filter(|e| seen.insert(e.id.clone()))
        .collect();
    merged.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.as_str().cmp(b.id.as_str()))
    });
    merged
}
