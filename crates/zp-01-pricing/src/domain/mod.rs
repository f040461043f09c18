//! Pricing domain types.

mod breakdown;
mod value_objects;

pub use breakdown::CostBreakdown;
pub use value_objects::{AgeCategory, PriceTier, PRICE_TIERS};
