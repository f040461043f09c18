//! # Zappy Place Scenario Suite
//!
//! Whole clients started against an in-memory relay network.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs        # Network, signing and event builders
//! └── scenarios/
//!     ├── backfill.rs    # Startup history across relays and pages
//!     ├── live.rs        # Live delivery, reconnects, relay-side closes
//!     ├── settlement.rs  # Receipts, ordering, submissions
//!     └── config.rs      # Config file and environment layering
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p zp-tests
//! cargo test -p zp-tests scenarios::live::
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod scenarios;
