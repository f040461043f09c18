//! # ZP-09 Canvas State
//!
//! The authoritative color of every cell.
//!
//! ## Resolution
//!
//! A candidate paint replaces the current one when:
//!
//! 1. the cell is empty, or
//! 2. the candidate is valid and the current paint is not, or
//! 3. both have the same validity and the candidate is strictly newer.
//!
//! Validity outranks recency: an unpaid or provisional paint never evicts
//! settled paint, however new it is. A paint from the same event only
//! replaces itself when it is being upgraded from provisional to settled.
//!
//! Every change is reported to a [`shared_bus::ChangeSink`] as one
//! [`shared_types::CellChange`] per cell.

#![warn(clippy::all)]

pub mod domain;
pub mod service;

pub use domain::supersedes;
pub use service::CanvasState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
