//! Pricing functions.

mod price;

pub use price::{age_category, price, quote};
