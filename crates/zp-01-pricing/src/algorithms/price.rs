//! Age-based pricing.

use shared_types::{Millisats, Timestamp};

use crate::domain::{AgeCategory, CostBreakdown, PRICE_TIERS};

/// Category of a cell whose paint was laid at `existing`, judged at `as_of`.
///
/// Paint dated after `as_of` counts as age zero.
pub fn age_category(existing: Option<Timestamp>, as_of: Timestamp) -> AgeCategory {
    let Some(painted_at) = existing else {
        return AgeCategory::New;
    };
    let age = as_of.saturating_sub(painted_at);
    PRICE_TIERS
        .iter()
        .find(|tier| age < tier.max_age_secs)
        .map(|tier| tier.category)
        .unwrap_or(AgeCategory::Ancient)
}

/// Price in millisatoshis of painting over `existing` at `as_of`.
pub fn price(existing: Option<Timestamp>, as_of: Timestamp) -> Millisats {
    age_category(existing, as_of).price()
}

/// Itemized price of painting every cell in `existing`.
pub fn quote<I>(existing: I, as_of: Timestamp) -> CostBreakdown
where
    I: IntoIterator<Item = Option<Timestamp>>,
{
    existing
        .into_iter()
        .fold(CostBreakdown::default(), |mut breakdown, ts| {
            breakdown.add(age_category(ts, as_of));
            breakdown
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOW: Timestamp = 1_760_000_000;
    const HOUR: u64 = 3600;

    #[test]
    fn test_empty_cell() {
        assert_eq!(price(None, NOW), 1_000);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(price(Some(NOW - 30 * 60), NOW), 10_000);
        assert_eq!(price(Some(NOW - HOUR + 1), NOW), 10_000);
        assert_eq!(price(Some(NOW - HOUR), NOW), 5_000);
        assert_eq!(price(Some(NOW - 12 * HOUR), NOW), 5_000);
        assert_eq!(price(Some(NOW - 24 * HOUR), NOW), 2_000);
        assert_eq!(price(Some(NOW - 72 * HOUR), NOW), 2_000);
        assert_eq!(price(Some(NOW - 168 * HOUR), NOW), 1_000);
        assert_eq!(price(Some(NOW - 200 * HOUR), NOW), 1_000);
    }

    #[test]
    fn test_future_paint_is_fresh() {
        assert_eq!(age_category(Some(NOW + 10), NOW), AgeCategory::Fresh);
    }

    #[test]
    fn test_quote_sums_cells() {
        let breakdown = quote([None, Some(NOW - 30 * 60), Some(NOW - 200 * HOUR)], NOW);
        assert_eq!(breakdown.total, 12_000);
        assert_eq!(breakdown.count(AgeCategory::New), 1);
        assert_eq!(breakdown.count(AgeCategory::Fresh), 1);
        assert_eq!(breakdown.count(AgeCategory::Ancient), 1);
    }

    proptest! {
        #[test]
        fn prop_older_never_costs_more(painted in 0u64..NOW, extra in 0u64..(400 * HOUR)) {
            let younger = price(Some(painted), painted + extra);
            let older = price(Some(painted), painted + extra + HOUR);
            prop_assert!(older <= younger);
        }

        #[test]
        fn prop_price_is_a_known_tier(painted in proptest::option::of(0u64..NOW)) {
            let p = price(painted, NOW);
            prop_assert!([1_000, 2_000, 5_000, 10_000].contains(&p));
        }
    }
}
