use shared_types::{Filter, Timestamp};

use crate::config::LiveFeedConfig;

/// Filter for canvas events created at or after `since`.
pub fn live_filter(config: &LiveFeedConfig, since: Timestamp) -> Filter {
    let mut filter = Filter::new()
        .kinds(config.kinds.iter().copied())
        .since(since);
    if let Some(target) = &config.target {
        filter = filter.p_tag(target.clone());
    }
    filter
}
