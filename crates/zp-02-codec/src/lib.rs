//! # ZP-02 Codec
//!
//! Turns placement batches into relay events and back.
//!
//! ## Pixel Payload (`gzip+base64:v1`)
//!
//! ```text
//! "x,y,#rrggbb\nx,y,#rrggbb..."  ──zlib──▶  bytes  ──base64──▶  event content
//! ```
//!
//! The decoder is strict: a bad checksum, a truncated stream, trailing bytes
//! or a malformed record fails the whole payload. A partial pixel list is
//! never returned.
//!
//! ## Module Structure
//!
//! ```text
//! zp-02-codec/
//! ├── domain/          # Decoded placements, receipts, CodecError
//! ├── algorithms/      # encode_pixels / decode_pixels
//! └── application/     # PlacementCodec building and reading events
//! ```

#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod domain;

// Re-exports
pub use algorithms::{decode_pixels, encode_pixels, MAX_DECODED_BYTES};
pub use application::PlacementCodec;
pub use domain::{CodecError, DecodedPlacement, PaymentReceipt, SettlementReceipt};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
