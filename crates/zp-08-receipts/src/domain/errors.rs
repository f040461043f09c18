use shared_types::EventId;
use thiserror::Error;

/// Why a placement or receipt was not taken into correlation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptError {
    #[error("receipt issuer {0} is not trusted")]
    UntrustedIssuer(String),

    #[error("receipt {0} declares no amount")]
    MissingAmount(EventId),

    #[error("placement {0} is already pending")]
    DuplicatePlacement(EventId),

    #[error("receipt {0} is already pending")]
    DuplicateReceipt(EventId),
}
