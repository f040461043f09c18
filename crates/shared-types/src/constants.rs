//! # Protocol Constants
//!
//! Event kinds, tag vocabulary and canvas geometry shared by publishers and
//! consumers. Changing any of these breaks interoperability with other
//! clients of the same canvas.

/// Side length of the square world. Valid coordinates are `0..WORLD_SIZE`.
pub const WORLD_SIZE: u32 = 2000;

/// Event kind carrying a placement batch.
pub const KIND_PLACEMENT: u32 = 90001;

/// Event kind of a payment request (zap request).
pub const KIND_PAYMENT_REQUEST: u32 = 9734;

/// Event kind of a payment receipt (zap receipt).
pub const KIND_PAYMENT_RECEIPT: u32 = 9735;

/// Application marker carried in the `app` tag.
pub const APP_NAME: &str = "Zappy Place";

/// Identifier of the only supported pixel payload encoding.
pub const ENCODING_V1: &str = "gzip+base64:v1";

/// Receipts whose inner request carries this version go through correlation.
/// Anything else is treated as a legacy self-contained receipt.
pub const PROTOCOL_VERSION: &str = "2";

/// Strict validation rejects batches dated further than this into the future.
pub const MAX_FUTURE_SKEW_SECS: u64 = 60;

/// Earliest creation time worth querying. Nothing was painted before it.
pub const DEFAULT_SINCE_FLOOR: u64 = 1_751_821_200;

/// Tag names used on placement, request and receipt events.
pub mod tag_names {
    /// Target canvas public key.
    pub const TARGET: &str = "p";
    /// Relays the payment receipt should be published to.
    pub const RELAYS: &str = "relays";
    /// Declared amount in millisatoshis.
    pub const AMOUNT: &str = "amount";
    /// Application marker.
    pub const APP: &str = "app";
    /// Payload encoding identifier.
    pub const ENCODING: &str = "encoding";
    /// Protocol version.
    pub const VERSION: &str = "version";
    /// Whether the placement waits for a payment receipt.
    pub const REQUIRES_PAYMENT: &str = "requires_payment";
    /// Free-form message attached by the painter.
    pub const MESSAGE: &str = "message";
    /// Free-form URL attached by the painter.
    pub const URL: &str = "url";
    /// Placement event a payment request pays for.
    pub const PIXEL_EVENT_ID: &str = "pixel_event_id";
    /// Serialized payment request embedded in a receipt.
    pub const DESCRIPTION: &str = "description";
}
