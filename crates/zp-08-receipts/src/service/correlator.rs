//! Two-sided matching of placements and receipts.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use shared_types::{EventId, Millisats};
use tracing::{debug, warn};
use zp_02_codec::{DecodedPlacement, SettlementReceipt};

use crate::config::ReceiptConfig;
use crate::domain::{Correlation, ReceiptError};

/// Receipts kept per placement id while the placement is missing. More than
/// one lets a correct receipt survive next to a bogus one.
const MAX_RECEIPTS_PER_PLACEMENT: usize = 4;

struct PendingPlacement {
    placement: DecodedPlacement,
    arrived: Instant,
}

struct PendingReceipt {
    receipt_id: EventId,
    amount: Millisats,
    arrived: Instant,
}

/// Holds the unmatched half of every paid placement.
pub struct ReceiptCorrelator {
    config: ReceiptConfig,
    placements: HashMap<EventId, PendingPlacement>,
    receipts: HashMap<EventId, Vec<PendingReceipt>>,
    receipt_count: usize,
    /// Placements pushed out by the size cap, reported by the next `expire`.
    evicted: Vec<EventId>,
}

impl ReceiptCorrelator {
    pub fn new(config: ReceiptConfig) -> Self {
        Self {
            config,
            placements: HashMap::new(),
            receipts: HashMap::new(),
            receipt_count: 0,
            evicted: Vec::new(),
        }
    }

    pub fn config(&self) -> &ReceiptConfig {
        &self.config
    }

    /// Feeds a decoded placement.
    pub fn on_placement(&mut self, placement: DecodedPlacement, arrived: Instant) -> Correlation {
        if !placement.requires_payment() {
            return Correlation::NotRequired(placement);
        }
        let id = placement.event_id.clone();
        if self.placements.contains_key(&id) {
            return Correlation::Ignored(ReceiptError::DuplicatePlacement(id));
        }

        let declared = placement.batch.amount;
        if let Some(waiting) = self.receipts.remove(&id) {
            let total = waiting.len();
            self.receipt_count -= total;
            if let Some(receipt) = waiting.into_iter().find(|r| r.amount == declared) {
                debug!(placement_id = %id, receipt_id = %receipt.receipt_id, "Placement settled by waiting receipt");
                return Correlation::Settled(placement);
            }
            // Every waiting receipt disagreed. They are dropped; the placement
            // waits for a correct one.
            warn!(placement_id = %id, receipts = total, "Receipt amount does not match placement");
            self.stash_placement(placement, arrived);
            return Correlation::Mismatch { placement_id: id };
        }

        self.stash_placement(placement, arrived);
        Correlation::Pending
    }

    /// Feeds a decoded settlement receipt.
    pub fn on_receipt(&mut self, receipt: SettlementReceipt, arrived: Instant) -> Correlation {
        if !self.config.trusts(&receipt.issuer) {
            return Correlation::Ignored(ReceiptError::UntrustedIssuer(receipt.issuer));
        }
        let Some(amount) = receipt.amount else {
            return Correlation::Ignored(ReceiptError::MissingAmount(receipt.receipt_id));
        };
        let placement_id = receipt.placement_id;

        if let Some(pending) = self.placements.get(&placement_id) {
            if pending.placement.batch.amount != amount {
                warn!(
                    placement_id = %placement_id,
                    receipt_id = %receipt.receipt_id,
                    "Receipt amount does not match placement"
                );
                return Correlation::Mismatch { placement_id };
            }
            return match self.placements.remove(&placement_id) {
                Some(pending) => {
                    debug!(placement_id = %placement_id, receipt_id = %receipt.receipt_id, "Placement settled");
                    Correlation::Settled(pending.placement)
                }
                None => Correlation::Pending,
            };
        }

        let waiting = self.receipts.entry(placement_id.clone()).or_default();
        if waiting.iter().any(|r| r.receipt_id == receipt.receipt_id) {
            return Correlation::Ignored(ReceiptError::DuplicateReceipt(receipt.receipt_id));
        }
        if waiting.len() >= MAX_RECEIPTS_PER_PLACEMENT {
            waiting.remove(0);
            self.receipt_count -= 1;
        }
        waiting.push(PendingReceipt {
            receipt_id: receipt.receipt_id,
            amount,
            arrived,
        });
        self.receipt_count += 1;
        if self.receipt_count > self.config.max_pending {
            self.prune_receipts();
        }
        Correlation::Pending
    }

    /// Drops every half that has waited longer than the pending TTL.
    ///
    /// Returns the placements that will never settle: expired ones plus any
    /// evicted by the size cap since the last call.
    pub fn expire(&mut self, now: Instant) -> Vec<EventId> {
        let ttl = self.config.pending_ttl();
        let stale = |arrived: Instant| now.saturating_duration_since(arrived) >= ttl;

        let mut dropped: Vec<EventId> = std::mem::take(&mut self.evicted);
        self.placements.retain(|id, pending| {
            if stale(pending.arrived) {
                dropped.push(id.clone());
                false
            } else {
                true
            }
        });
        for waiting in self.receipts.values_mut() {
            waiting.retain(|r| !stale(r.arrived));
        }
        self.receipts.retain(|_, waiting| !waiting.is_empty());
        self.receipt_count = self.receipts.values().map(Vec::len).sum();

        if !dropped.is_empty() {
            debug!(placements = dropped.len(), "Unsettled placements expired");
        }
        dropped
    }

    pub fn pending_placements(&self) -> usize {
        self.placements.len()
    }

    /// Receipts waiting for their placement.
    pub fn pending_receipts(&self) -> usize {
        self.receipt_count
    }

    pub fn is_pending(&self, placement_id: &EventId) -> bool {
        self.placements.contains_key(placement_id)
    }

    fn stash_placement(&mut self, placement: DecodedPlacement, arrived: Instant) {
        self.placements.insert(
            placement.event_id.clone(),
            PendingPlacement { placement, arrived },
        );
        if self.placements.len() > self.config.max_pending {
            self.prune_placements();
        }
    }

    /// Keeps the most recently arrived half of the pending placements.
    fn prune_placements(&mut self) {
        let mut order: Vec<(Instant, EventId)> = self
            .placements
            .iter()
            .map(|(id, p)| (p.arrived, id.clone()))
            .collect();
        order.sort_unstable();
        let drop = order.len() - retained(self.config.max_pending);
        for (_, id) in order.into_iter().take(drop) {
            self.placements.remove(&id);
            self.evicted.push(id);
        }
        warn!(dropped = drop, retained = self.placements.len(), "Pending placements pruned");
    }

    /// Keeps the most recently arrived half of the waiting receipts.
    fn prune_receipts(&mut self) {
        let mut order: Vec<(Instant, &EventId)> = self
            .receipts
            .values()
            .flatten()
            .map(|r| (r.arrived, &r.receipt_id))
            .collect();
        order.sort_unstable();
        let drop = order.len() - retained(self.config.max_pending);
        let doomed: HashSet<EventId> = order
            .into_iter()
            .take(drop)
            .map(|(_, id)| id.clone())
            .collect();

        for waiting in self.receipts.values_mut() {
            waiting.retain(|r| !doomed.contains(&r.receipt_id));
        }
        self.receipts.retain(|_, waiting| !waiting.is_empty());
        self.receipt_count = self.receipts.values().map(Vec::len).sum();
        warn!(dropped = drop, retained = self.receipt_count, "Waiting receipts pruned");
    }
}

/// Entries left after a table outgrows `cap`.
fn retained(cap: usize) -> usize {
    (cap / 2).max(1)
}
