//! Relay pool service.

mod commands;
mod pool;
mod worker;

pub use pool::RelayPool;
