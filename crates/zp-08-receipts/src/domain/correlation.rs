use shared_types::EventId;
use zp_02_codec::DecodedPlacement;

use super::ReceiptError;

/// Outcome of feeding one half into the correlator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correlation {
    /// Both halves present with equal amounts. The placement may be painted.
    Settled(DecodedPlacement),
    /// The placement does not ask for payment and is passed straight through.
    NotRequired(DecodedPlacement),
    /// Waiting for the other half.
    Pending,
    /// Amounts disagreed. The receipt was dropped, the placement keeps waiting.
    Mismatch { placement_id: EventId },
    /// Not taken into correlation.
    Ignored(ReceiptError),
}

impl Correlation {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Correlation::Settled(_) => "matched",
            Correlation::NotRequired(_) => "unpaid",
            Correlation::Pending => "pending",
            Correlation::Mismatch { .. } => "mismatched",
            Correlation::Ignored(_) => "ignored",
        }
    }
}
