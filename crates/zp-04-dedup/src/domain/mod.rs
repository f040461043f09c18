//! Dedup domain.

mod processed_set;

pub use processed_set::ProcessedEventSet;
