//! # Shared Types Crate
//!
//! Domain entities, the relay wire event and the protocol constants used by
//! every component of the canvas client.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Wire shape stays dumb**: [`TransportEvent`] mirrors the relay JSON
//!   exactly. Interpretation of tags lives in [`TagSet`], interpretation of
//!   payloads lives in the codec crate.
//! - **Millisatoshis everywhere**: every amount in this workspace is an
//!   integer number of millisatoshis.

pub mod constants;
pub mod entities;
pub mod errors;
pub mod event;
pub mod tags;

pub use constants::*;
pub use entities::*;
pub use errors::*;
pub use event::*;
pub use tags::TagSet;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in unix seconds.
///
/// Returns 0 if the system clock is set before the epoch.
pub fn unix_now() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
