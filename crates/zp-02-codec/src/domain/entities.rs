//! Decoded forms of canvas events.

use shared_types::{EventId, Millisats, PlacementBatch, TagSet, Timestamp, TransportEvent};

/// A placement event with its payload unpacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPlacement {
    pub event_id: EventId,
    pub author: String,
    pub created_at: Timestamp,
    /// Pixels and declared amount. `author` and `timestamp` are filled in.
    pub batch: PlacementBatch,
    pub tags: TagSet,
}

impl DecodedPlacement {
    /// Whether the placement waits for a receipt before it counts.
    pub fn requires_payment(&self) -> bool {
        self.tags.requires_payment
    }
}

/// Receipt referencing a separately published placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub receipt_id: EventId,
    /// Key that published the receipt (the payee's payment service).
    pub issuer: String,
    pub placement_id: EventId,
    /// Amount requested in the embedded payment request.
    pub amount: Option<Millisats>,
    pub created_at: Timestamp,
}

/// What a receipt turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentReceipt {
    /// Current protocol: pairs with a placement event by id.
    Settlement(SettlementReceipt),
    /// Older protocol: the embedded request itself carries the pixels.
    Legacy {
        receipt_id: EventId,
        issuer: String,
        /// The embedded payment request.
        request: TransportEvent,
    },
}

impl PaymentReceipt {
    pub fn receipt_id(&self) -> &EventId {
        match self {
            PaymentReceipt::Settlement(s) => &s.receipt_id,
            PaymentReceipt::Legacy { receipt_id, .. } => receipt_id,
        }
    }

    pub fn issuer(&self) -> &str {
        match self {
            PaymentReceipt::Settlement(s) => &s.issuer,
            PaymentReceipt::Legacy { issuer, .. } => issuer,
        }
    }
}
