//! History sync service.

mod sync;

pub use sync::HistoricalSync;
