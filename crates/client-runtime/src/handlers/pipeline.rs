//! # Event Pipeline
//!
//! The single consumer that turns relay events into canvas state. History
//! replay, live delivery and local submissions all pass through here, one
//! event at a time, behind one mutex.
//!
//! ```text
//! event ─▶ seen? ─▶ verify ─▶ mark seen ─▶ decode ─▶ correlate ─▶ validate ─▶ apply
//!            │         │                      │          │            │         │
//!        Duplicate  Rejected              Rejected    Pending     Rejected  Superseded
//! ```
//!
//! A forged event is never marked as seen, so a genuine copy arriving later
//! from another relay is still processed.

use std::sync::Arc;
use std::time::Instant;

use canvas_telemetry::{
    metric_inc, CELLS_PAINTED, EVENTS_RECEIVED, EVENTS_REJECTED, PENDING_PLACEMENTS,
    PLACEMENTS_APPLIED, RECEIPTS,
};
use shared_bus::{ChangeSink, Origin};
use shared_crypto::verify_event;
use shared_types::{
    CellCoord, CellPaint, EventId, Pixel, PlacementBatch, Timestamp, TransportEvent,
    KIND_PAYMENT_RECEIPT, KIND_PLACEMENT,
};
use tracing::{debug, info, warn};
use zp_01_pricing::CostBreakdown;
use zp_02_codec::{CodecError, DecodedPlacement, PaymentReceipt, PlacementCodec};
use zp_03_validation::{ValidationFailure, ValidationMode, Validator};
use zp_04_dedup::ProcessedEventSet;
use zp_08_receipts::{Correlation, ReceiptCorrelator};
use zp_09_canvas_state::CanvasState;

use crate::container::ClientConfig;
use crate::errors::ClientError;

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A placement reached the canvas. `cells` counts visible changes.
    Applied { cells: usize },
    /// A valid placement that newer paint already covers everywhere.
    Superseded,
    /// Half of a paid placement, waiting for its partner.
    Pending,
    /// Already processed.
    Duplicate,
    /// Not something this canvas acts on.
    Ignored,
    /// Dropped for `reason`.
    Rejected { reason: &'static str },
}

/// Metrics label for where an event came from.
pub fn origin_label(origin: Origin) -> &'static str {
    match origin {
        Origin::History => "history",
        Origin::Live => "live",
        Origin::Local => "local",
    }
}

/// Owns the dedup set, the correlator and the canvas.
pub struct EventPipeline {
    codec: PlacementCodec,
    validator: Validator,
    dedup: ProcessedEventSet,
    correlator: ReceiptCorrelator,
    canvas: CanvasState,
    history_mode: ValidationMode,
}

impl EventPipeline {
    pub fn new(config: &ClientConfig, sink: Arc<dyn ChangeSink>) -> Self {
        Self {
            codec: PlacementCodec::new(
                config.canvas_pubkey.clone(),
                config.relay_pool.relays.clone(),
            ),
            validator: Validator::new(config.validation.clone()),
            dedup: ProcessedEventSet::new(&config.dedup),
            correlator: ReceiptCorrelator::new(config.receipts.clone()),
            canvas: CanvasState::with_world_size(sink, config.validation.world_size),
            history_mode: config.history_mode,
        }
    }

    pub fn codec(&self) -> &PlacementCodec {
        &self.codec
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    pub fn cell(&self, coord: CellCoord) -> Option<CellPaint> {
        self.canvas.get(coord).cloned()
    }

    pub fn pending_placements(&self) -> usize {
        self.correlator.pending_placements()
    }

    /// Validation mode for events from `origin`. Live events tolerate clock
    /// skew between peers; everything the user submits is strict.
    pub fn mode_for(&self, origin: Origin) -> ValidationMode {
        match origin {
            Origin::History => self.history_mode,
            Origin::Live => ValidationMode::Optimistic,
            Origin::Local => ValidationMode::Strict,
        }
    }

    /// Runs one relay event through the pipeline.
    pub fn ingest(
        &mut self,
        origin: Origin,
        event: TransportEvent,
        now: Timestamp,
        arrived: Instant,
    ) -> IngestOutcome {
        let topic = match event.kind {
            KIND_PLACEMENT => "placement",
            KIND_PAYMENT_RECEIPT => "receipt",
            _ => return IngestOutcome::Ignored,
        };
        metric_inc!(EVENTS_RECEIVED, &[topic, origin_label(origin)]);

        if self.dedup.seen(&event.id) {
            return duplicate();
        }
        if let Err(e) = verify_event(&event) {
            warn!(event_id = %event.id, error = %e, "Dropping event with bad signature");
            return rejected("forged");
        }
        self.dedup.mark_seen(event.id.clone());

        let outcome = if event.kind == KIND_PLACEMENT {
            self.on_placement(origin, &event, now, arrived)
        } else {
            self.on_receipt(origin, &event, now, arrived)
        };
        PENDING_PLACEMENTS.set(self.correlator.pending_placements() as f64);
        outcome
    }

    fn on_placement(
        &mut self,
        origin: Origin,
        event: &TransportEvent,
        now: Timestamp,
        arrived: Instant,
    ) -> IngestOutcome {
        let placement = match self.codec.decode_placement(event) {
            Ok(placement) => placement,
            Err(e) => return decode_failure(&event.id, &e),
        };
        if !self.targets_canvas(&placement) {
            return rejected("foreign");
        }

        match self.correlator.on_placement(placement, arrived) {
            Correlation::Settled(placement) | Correlation::NotRequired(placement) => {
                self.settle(placement, self.mode_for(origin), now)
            }
            Correlation::Pending => IngestOutcome::Pending,
            Correlation::Mismatch { .. } | Correlation::Ignored(_) => IngestOutcome::Ignored,
        }
    }

    fn on_receipt(
        &mut self,
        origin: Origin,
        event: &TransportEvent,
        now: Timestamp,
        arrived: Instant,
    ) -> IngestOutcome {
        let receipt = match self.codec.decode_receipt(event) {
            Ok(receipt) => receipt,
            Err(e) => return decode_failure(&event.id, &e),
        };

        match receipt {
            PaymentReceipt::Settlement(settlement) => {
                let correlation = self.correlator.on_receipt(settlement, arrived);
                metric_inc!(RECEIPTS, &[correlation.label()]);
                match correlation {
                    Correlation::Settled(placement) => {
                        self.settle(placement, self.mode_for(origin), now)
                    }
                    Correlation::Pending => IngestOutcome::Pending,
                    Correlation::Mismatch { .. } => rejected("mismatched"),
                    Correlation::NotRequired(_) | Correlation::Ignored(_) => IngestOutcome::Ignored,
                }
            }
            PaymentReceipt::Legacy {
                receipt_id,
                issuer,
                request,
            } => {
                metric_inc!(RECEIPTS, &["legacy"]);
                self.on_legacy(origin, receipt_id, &issuer, request, now)
            }
        }
    }

    /// Older receipts carry the pixels in the embedded payment request. The
    /// receipt itself is the proof of payment.
    fn on_legacy(
        &mut self,
        origin: Origin,
        receipt_id: EventId,
        issuer: &str,
        request: TransportEvent,
        now: Timestamp,
    ) -> IngestOutcome {
        if !self.correlator.config().trusts(issuer) {
            debug!(receipt_id = %receipt_id, issuer, "Ignoring receipt from untrusted issuer");
            return IngestOutcome::Ignored;
        }
        if self.dedup.seen(&request.id) {
            return duplicate();
        }
        if let Err(e) = verify_event(&request) {
            warn!(receipt_id = %receipt_id, error = %e, "Embedded request has a bad signature");
            return rejected("forged");
        }
        self.dedup.mark_seen(request.id.clone());

        let placement = match self.codec.decode_legacy_request(&request) {
            Ok(placement) => placement,
            Err(e) => return decode_failure(&receipt_id, &e),
        };
        if !self.targets_canvas(&placement) {
            return rejected("foreign");
        }
        self.settle(placement, self.mode_for(origin), now)
    }

    fn targets_canvas(&self, placement: &DecodedPlacement) -> bool {
        placement.tags.target.as_deref() == Some(self.codec.canvas_pubkey())
    }

    /// Validates against the current canvas and paints on success.
    fn settle(
        &mut self,
        placement: DecodedPlacement,
        mode: ValidationMode,
        now: Timestamp,
    ) -> IngestOutcome {
        let canvas = &self.canvas;
        if let Err(failure) =
            self.validator
                .validate(&placement.batch, mode, now, |c| canvas.existing_timestamp(c))
        {
            warn!(
                event_id = %placement.event_id,
                author = %placement.author,
                kind = failure.primary_kind(),
                violations = failure.errors.len(),
                "Placement failed validation"
            );
            metric_inc!(EVENTS_REJECTED, &["invalid"]);
            return IngestOutcome::Rejected {
                reason: failure.primary_kind(),
            };
        }

        let cells = self
            .canvas
            .apply_batch(&placement.batch, &placement.event_id, true);
        if cells == 0 {
            debug!(event_id = %placement.event_id, "Placement superseded by newer paint");
            metric_inc!(EVENTS_REJECTED, &["superseded"]);
            return IngestOutcome::Superseded;
        }
        metric_inc!(PLACEMENTS_APPLIED);
        CELLS_PAINTED.inc_by(cells as f64);
        debug!(
            event_id = %placement.event_id,
            pixels = placement.batch.len(),
            cells,
            "Placement applied"
        );
        IngestOutcome::Applied { cells }
    }

    /// Strict check of a batch the user is about to submit.
    pub fn preflight(&self, batch: &PlacementBatch, now: Timestamp) -> Result<(), ValidationFailure> {
        let canvas = &self.canvas;
        self.validator
            .validate(batch, ValidationMode::Strict, now, |c| canvas.existing_timestamp(c))
    }

    /// Paints the user's own published placement provisionally and parks it
    /// until its receipt arrives. Returns the cells painted.
    pub fn stage_local(&mut self, event: &TransportEvent, arrived: Instant) -> Result<usize, ClientError> {
        let placement = self.codec.decode_placement(event)?;
        self.dedup.mark_seen(event.id.clone());
        metric_inc!(EVENTS_RECEIVED, &["placement", origin_label(Origin::Local)]);

        let batch = placement.batch.clone();
        let event_id = placement.event_id.clone();
        // The relay may echo the event back before we get here, in which
        // case the correlator already holds it.
        let cells = match self.correlator.on_placement(placement, arrived) {
            Correlation::Settled(placement) | Correlation::NotRequired(placement) => {
                match self.settle(placement, ValidationMode::Strict, batch.timestamp.unwrap_or(0)) {
                    IngestOutcome::Applied { cells } => cells,
                    _ => 0,
                }
            }
            _ if self.correlator.is_pending(&event_id) => {
                self.canvas.apply_batch(&batch, &event_id, false)
            }
            _ => 0,
        };
        PENDING_PLACEMENTS.set(self.correlator.pending_placements() as f64);
        info!(event_id = %event_id, cells, "Local placement staged");
        Ok(cells)
    }

    /// Drops placements that never settled and clears their provisional
    /// paint. Returns the number of cells cleared.
    pub fn expire(&mut self, now: Instant) -> usize {
        let expired = self.correlator.expire(now);
        let mut cleared = 0;
        for event_id in &expired {
            cleared += self.canvas.revert(event_id);
        }
        if !expired.is_empty() {
            metric_inc!(RECEIPTS, &["expired"]);
            info!(placements = expired.len(), cleared, "Unsettled placements expired");
        }
        PENDING_PLACEMENTS.set(self.correlator.pending_placements() as f64);
        cleared
    }

    /// Price of painting `pixels` at `as_of` given settled paint.
    pub fn quote(&self, pixels: &[Pixel], as_of: Timestamp) -> CostBreakdown {
        let canvas = &self.canvas;
        self.validator
            .breakdown(pixels, as_of, |c| canvas.existing_timestamp(c))
    }
}

fn rejected(reason: &'static str) -> IngestOutcome {
    metric_inc!(EVENTS_REJECTED, &[reason]);
    IngestOutcome::Rejected { reason }
}

fn duplicate() -> IngestOutcome {
    metric_inc!(EVENTS_REJECTED, &["duplicate"]);
    IngestOutcome::Duplicate
}

fn decode_failure(event_id: &EventId, error: &CodecError) -> IngestOutcome {
    match error {
        CodecError::ForeignApplication(_) | CodecError::WrongKind { .. } => {
            debug!(event_id = %event_id, error = %error, "Skipping event from another application");
            rejected("foreign")
        }
        _ => {
            warn!(event_id = %event_id, error = %error, "Dropping undecodable event");
            rejected("undecodable")
        }
    }
}
