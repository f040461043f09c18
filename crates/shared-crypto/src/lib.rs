//! # Shared Crypto - Event Identity and Signatures
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Event id over the canonical serialization |
//! | `schnorr` | BIP-340 over secp256k1 | Signing and verifying events |
//!
//! ## Security Properties
//!
//! - **Event ids** are recomputed on receipt; a relay cannot relabel content.
//! - **Schnorr** signatures cover the 32-byte id, x-only public keys.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod schnorr;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{canonical_serialization, event_id};
pub use schnorr::{verify_event, EventKeys};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
