//! Pagination algorithms.

mod cursor;

pub use cursor::{merge_chronological, next_step, scan_page, PageDecision, PageScan};
