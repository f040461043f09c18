//! Codec domain types.

mod entities;
mod errors;

pub use entities::{DecodedPlacement, PaymentReceipt, SettlementReceipt};
pub use errors::CodecError;
