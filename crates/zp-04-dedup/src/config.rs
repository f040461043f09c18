//! Dedup configuration.

use serde::{Deserialize, Serialize};

/// Configuration for [`ProcessedEventSet`](crate::ProcessedEventSet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Ids held before the oldest half is pruned.
    pub capacity: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self { capacity: 10_000 }
    }
}

impl DedupConfig {
    pub fn for_testing() -> Self {
        Self { capacity: 8 }
    }
}
