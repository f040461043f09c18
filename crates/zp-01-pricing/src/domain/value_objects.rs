//! Price tiers and the age categories they map to.

use serde::{Deserialize, Serialize};
use shared_types::Millisats;

const HOUR: u64 = 3600;

/// Age bucket of the paint currently in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeCategory {
    /// Nothing painted yet.
    New,
    /// Painted less than an hour ago.
    Fresh,
    /// Less than a day old.
    Recent,
    /// Less than a week old.
    Aging,
    /// A week or older.
    Ancient,
}

impl AgeCategory {
    /// Every category, in display order.
    pub const ALL: [AgeCategory; 5] = [
        AgeCategory::New,
        AgeCategory::Fresh,
        AgeCategory::Recent,
        AgeCategory::Aging,
        AgeCategory::Ancient,
    ];

    /// Price of covering paint in this category.
    pub fn price(self) -> Millisats {
        match self {
            AgeCategory::New => 1_000,
            AgeCategory::Fresh => 10_000,
            AgeCategory::Recent => 5_000,
            AgeCategory::Aging => 2_000,
            AgeCategory::Ancient => 1_000,
        }
    }

    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            AgeCategory::New => "new",
            AgeCategory::Fresh => "fresh",
            AgeCategory::Recent => "recent",
            AgeCategory::Aging => "aging",
            AgeCategory::Ancient => "ancient",
        }
    }
}

/// An upper age bound (exclusive) and the category below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTier {
    /// Paint younger than this many seconds falls in `category`.
    pub max_age_secs: u64,
    /// Category assigned below the bound.
    pub category: AgeCategory,
}

/// Bounded tiers, youngest first. Anything older is [`AgeCategory::Ancient`].
pub const PRICE_TIERS: [PriceTier; 3] = [
    PriceTier {
        max_age_secs: HOUR,
        category: AgeCategory::Fresh,
    },
    PriceTier {
        max_age_secs: 24 * HOUR,
        category: AgeCategory::Recent,
    },
    PriceTier {
        max_age_secs: 168 * HOUR,
        category: AgeCategory::Aging,
    },
];
