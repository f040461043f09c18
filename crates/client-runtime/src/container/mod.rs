//! # Client Container
//!
//! Configuration shared by every component the client wires together.

pub mod config;

pub use config::{ClientConfig, ConfigError, DEFAULT_LNURL_ENDPOINT};
