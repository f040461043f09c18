//! # ZP-01 Pricing
//!
//! Price of painting one cell, derived from how long the current paint has
//! been there. Fresh paint is expensive to cover, old paint is cheap.
//!
//! | Existing paint age | Price (msats) |
//! |--------------------|---------------|
//! | none | 1000 |
//! | under 1 hour | 10000 |
//! | under 24 hours | 5000 |
//! | under 7 days | 2000 |
//! | 7 days or older | 1000 |
//!
//! ## Module Structure
//!
//! ```text
//! zp-01-pricing/
//! ├── domain/          # Price tiers, age categories, cost breakdown
//! └── algorithms/      # price(), age_category(), quote()
//! ```
//!
//! Pure and deterministic. The same inputs price identically on every
//! client, which is what lets validators agree on the required amount.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;

// Re-exports
pub use algorithms::{age_category, price, quote};
pub use domain::{AgeCategory, CostBreakdown, PriceTier, PRICE_TIERS};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
