//! # ZP-03 Validation
//!
//! Decides whether a placement batch may be painted.
//!
//! ## Rules
//!
//! | Rule | Failure |
//! |------|---------|
//! | Batch has pixels | `EmptyBatch` |
//! | Every coordinate inside the world | `InvalidCoordinates` |
//! | Every color is `#rrggbb` | `InvalidColor` |
//! | Timestamp not too far ahead (strict only) | `InvalidTimestamp` |
//! | Declared amount equals the priced total | `AmountMismatch` |
//!
//! The amount is only checked when every pixel is well formed, so a bad
//! pixel never also reports a misleading price.
//!
//! ## Module Structure
//!
//! ```text
//! zp-03-validation/
//! ├── domain/          # ValidationError, ValidationFailure, ValidationMode
//! ├── algorithms/      # Per-pixel rules
//! ├── application/     # Validator
//! └── config.rs        # ValidationConfig
//! ```

#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;

// Re-exports
pub use algorithms::{check_pixel, is_valid_color};
pub use application::Validator;
pub use config::ValidationConfig;
pub use domain::{summarize, ValidationError, ValidationFailure, ValidationMode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
