//! Insertion-ordered id set with half pruning.

use std::collections::{HashSet, VecDeque};

use shared_types::EventId;
use tracing::debug;

use crate::config::DedupConfig;

/// Ids of events already processed.
#[derive(Debug)]
pub struct ProcessedEventSet {
    ids: HashSet<EventId>,
    insertion_order: VecDeque<EventId>,
    capacity: usize,
}

impl ProcessedEventSet {
    pub fn new(config: &DedupConfig) -> Self {
        let capacity = config.capacity.max(2);
        Self {
            ids: HashSet::with_capacity(capacity + 1),
            insertion_order: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn seen(&self, id: &EventId) -> bool {
        self.ids.contains(id)
    }

    /// Records `id`. Returns `false` if it was already present.
    pub fn mark_seen(&mut self, id: EventId) -> bool {
        if !self.ids.insert(id.clone()) {
            return false;
        }
        self.insertion_order.push_back(id);

        if self.ids.len() > self.capacity {
            self.prune();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keeps only the most recently inserted half.
    fn prune(&mut self) {
        let keep = self.insertion_order.len() / 2;
        let drop = self.insertion_order.len() - keep;
        for id in self.insertion_order.drain(..drop) {
            self.ids.remove(&id);
        }
        debug!(dropped = drop, retained = keep, "Pruned processed event ids");
    }
}

impl Default for ProcessedEventSet {
    fn default() -> Self {
        Self::new(&DedupConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(n: usize) -> EventId {
        EventId::new(format!("{n:064x}"))
    }

    #[test]
    fn test_mark_and_check() {
        let mut set = ProcessedEventSet::default();
        assert!(!set.seen(&id(1)));
        assert!(set.mark_seen(id(1)));
        assert!(set.seen(&id(1)));
        assert!(!set.mark_seen(id(1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_exceeding_capacity_keeps_newest_half() {
        let mut set = ProcessedEventSet::new(&DedupConfig::for_testing());
        for n in 0..=8 {
            set.mark_seen(id(n));
        }
        // 9 > 8 triggers pruning down to the newest 4.
        assert_eq!(set.len(), 4);
        for n in 0..5 {
            assert!(!set.seen(&id(n)), "id {n} should be forgotten");
        }
        for n in 5..=8 {
            assert!(set.seen(&id(n)), "id {n} should be retained");
        }
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(ids in proptest::collection::vec(0usize..500, 0..300)) {
            let mut set = ProcessedEventSet::new(&DedupConfig { capacity: 50 });
            for n in ids {
                set.mark_seen(id(n));
                prop_assert!(set.len() <= set.capacity());
            }
        }

        #[test]
        fn prop_last_inserted_always_seen(ids in proptest::collection::vec(0usize..500, 1..300)) {
            let mut set = ProcessedEventSet::new(&DedupConfig { capacity: 50 });
            for n in &ids {
                set.mark_seen(id(*n));
            }
            prop_assert!(set.seen(&id(*ids.last().unwrap())));
        }
    }
}
