//! Itemized cost of a batch.

use serde::{Deserialize, Serialize};
use shared_types::Millisats;

use super::AgeCategory;

/// Cell counts per age category and the resulting total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    counts: [usize; 5],
    /// Sum of all cell prices in millisatoshis.
    pub total: Millisats,
}

impl CostBreakdown {
    /// Adds one cell.
    pub fn add(&mut self, category: AgeCategory) {
        self.counts[Self::slot(category)] += 1;
        self.total += category.price();
    }

    /// Cells priced in `category`.
    pub fn count(&self, category: AgeCategory) -> usize {
        self.counts[Self::slot(category)]
    }

    /// Number of cells priced.
    pub fn cells(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Total rounded down to whole satoshis.
    pub fn total_sats(&self) -> u64 {
        self.total / 1000
    }

    /// Human readable line, e.g. `2 new, 1 fresh = 12 sats`.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = AgeCategory::ALL
            .iter()
            .filter(|c| self.count(**c) > 0)
            .map(|c| format!("{} {}", self.count(*c), c.as_str()))
            .collect();
        if parts.is_empty() {
            return "nothing to pay".to_string();
        }
        format!("{} = {} sats", parts.join(", "), self.total_sats())
    }

    fn slot(category: AgeCategory) -> usize {
        match category {
            AgeCategory::New => 0,
            AgeCategory::Fresh => 1,
            AgeCategory::Recent => 2,
            AgeCategory::Aging => 3,
            AgeCategory::Ancient => 4,
        }
    }
}
