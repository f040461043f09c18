//! Cell store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use shared_bus::ChangeSink;
use shared_types::{
    CellChange, CellCoord, CellPaint, EventId, PlacementBatch, Timestamp, WORLD_SIZE,
};
use tracing::{debug, trace};

use crate::domain::supersedes;

/// Sparse map of painted cells.
pub struct CanvasState {
    world_size: u32,
    cells: HashMap<CellCoord, CellPaint>,
    /// Cells currently holding each event's provisional paint.
    provisional: HashMap<EventId, HashSet<CellCoord>>,
    sink: Arc<dyn ChangeSink>,
}

impl CanvasState {
    pub fn new(sink: Arc<dyn ChangeSink>) -> Self {
        Self::with_world_size(sink, WORLD_SIZE)
    }

    pub fn with_world_size(sink: Arc<dyn ChangeSink>, world_size: u32) -> Self {
        Self {
            world_size,
            cells: HashMap::new(),
            provisional: HashMap::new(),
            sink,
        }
    }

    pub fn world_size(&self) -> u32 {
        self.world_size
    }

    pub fn get(&self, coord: CellCoord) -> Option<&CellPaint> {
        self.cells.get(&coord)
    }

    /// Timestamp of settled paint at `coord`. Provisional paint does not
    /// count, so it never changes a price.
    pub fn existing_timestamp(&self, coord: CellCoord) -> Option<Timestamp> {
        self.cells
            .get(&coord)
            .filter(|paint| paint.valid)
            .map(|paint| paint.timestamp)
    }

    /// Offers `candidate` for one cell. Returns whether it was taken.
    pub fn apply(&mut self, coord: CellCoord, candidate: CellPaint) -> bool {
        if coord.x >= self.world_size || coord.y >= self.world_size {
            return false;
        }
        if !supersedes(&candidate, self.cells.get(&coord)) {
            trace!(cell = %coord, event_id = %candidate.event_id, "Paint kept");
            return false;
        }

        if !candidate.valid {
            self.provisional
                .entry(candidate.event_id.clone())
                .or_default()
                .insert(coord);
        }
        if let Some(previous) = self.cells.insert(coord, candidate.clone()) {
            if !previous.valid {
                self.unindex(&previous.event_id, coord);
            }
        }
        self.sink.notify(CellChange::Painted {
            coord,
            paint: candidate,
        });
        true
    }

    /// Offers every pixel of a batch. When a batch paints the same cell more
    /// than once, its last pixel for that cell is used. Returns the number of
    /// cells that changed.
    pub fn apply_batch(&mut self, batch: &PlacementBatch, event_id: &EventId, valid: bool) -> usize {
        let mut last_per_cell: HashMap<CellCoord, &str> = HashMap::new();
        let mut order: Vec<CellCoord> = Vec::new();
        for pixel in &batch.pixels {
            let Some(coord) = CellCoord::from_pixel(pixel, self.world_size) else {
                continue;
            };
            if last_per_cell.insert(coord, &pixel.color).is_none() {
                order.push(coord);
            }
        }

        let author = batch.author.clone().unwrap_or_default();
        let timestamp = batch.timestamp.unwrap_or(0);
        let mut changed = 0;
        for coord in order {
            let Some(color) = last_per_cell.get(&coord) else {
                continue;
            };
            let paint = CellPaint {
                color: color.to_string(),
                event_id: event_id.clone(),
                author: author.clone(),
                timestamp,
                valid,
            };
            if self.apply(coord, paint) {
                changed += 1;
            }
        }
        debug!(event_id = %event_id, valid, changed, "Batch applied");
        changed
    }

    /// Clears every cell still showing `event_id`'s provisional paint.
    /// Returns the number of cells cleared.
    pub fn revert(&mut self, event_id: &EventId) -> usize {
        let Some(coords) = self.provisional.remove(event_id) else {
            return 0;
        };
        let mut cleared = 0;
        for coord in coords {
            let still_ours = self
                .cells
                .get(&coord)
                .is_some_and(|paint| !paint.valid && paint.event_id == *event_id);
            if still_ours {
                self.cells.remove(&coord);
                self.sink.notify(CellChange::Cleared { coord });
                cleared += 1;
            }
        }
        debug!(event_id = %event_id, cleared, "Provisional paint reverted");
        cleared
    }

    /// Painted cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellCoord, &CellPaint)> {
        self.cells.iter()
    }

    /// Events with provisional paint still on the canvas.
    pub fn provisional_events(&self) -> usize {
        self.provisional.len()
    }

    fn unindex(&mut self, event_id: &EventId, coord: CellCoord) {
        if let Some(coords) = self.provisional.get_mut(event_id) {
            coords.remove(&coord);
            if coords.is_empty() {
                self.provisional.remove(event_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::RecordingSink;
    use shared_types::Pixel;

    fn canvas() -> (CanvasState, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let state = CanvasState::with_world_size(Arc::clone(&sink) as Arc<dyn ChangeSink>, 16);
        (state, sink)
    }

    fn batch(pixels: Vec<Pixel>, timestamp: Timestamp) -> PlacementBatch {
        let mut batch = PlacementBatch::new(pixels, 1_000);
        batch.author = Some("painter".into());
        batch.timestamp = Some(timestamp);
        batch
    }

    fn id(s: &str) -> EventId {
        EventId::new(s)
    }

    #[test]
    fn test_apply_batch_paints_and_notifies_per_cell() {
        let (mut state, sink) = canvas();
        let b = batch(
            vec![Pixel::new(1, 1, "#ff0000"), Pixel::new(2, 1, "#00ff00")],
            100,
        );
        assert_eq!(state.apply_batch(&b, &id("e1"), true), 2);
        assert_eq!(state.len(), 2);
        assert_eq!(sink.take().len(), 2);

        let paint = state.get(CellCoord::new(1, 1)).unwrap();
        assert_eq!(paint.color, "#ff0000");
        assert_eq!(paint.author, "painter");
        assert_eq!(state.existing_timestamp(CellCoord::new(1, 1)), Some(100));
    }

    #[test]
    fn test_reapplying_same_event_is_silent() {
        let (mut state, sink) = canvas();
        let b = batch(vec![Pixel::new(3, 3, "#123456")], 100);
        state.apply_batch(&b, &id("e1"), true);
        sink.take();
        assert_eq!(state.apply_batch(&b, &id("e1"), true), 0);
        assert!(sink.changes().is_empty());
    }

    #[test]
    fn test_older_event_after_newer_is_rejected() {
        let (mut state, _sink) = canvas();
        state.apply_batch(&batch(vec![Pixel::new(0, 0, "#222222")], 200), &id("new"), true);
        state.apply_batch(&batch(vec![Pixel::new(0, 0, "#111111")], 100), &id("old"), true);
        assert_eq!(state.get(CellCoord::new(0, 0)).unwrap().color, "#222222");
    }

    #[test]
    fn test_same_second_tie_is_order_independent() {
        for [first, second] in [["e1", "e2"], ["e2", "e1"]] {
            let (mut state, _sink) = canvas();
            let color = |e: &str| if e == "e1" { "#111111" } else { "#222222" };
            state.apply_batch(&batch(vec![Pixel::new(5, 5, color(first))], 100), &id(first), true);
            state.apply_batch(&batch(vec![Pixel::new(5, 5, color(second))], 100), &id(second), true);
            let paint = state.get(CellCoord::new(5, 5)).unwrap();
            assert_eq!(paint.event_id, id("e2"));
            assert_eq!(paint.color, "#222222");
        }
    }

    #[test]
    fn test_last_pixel_in_batch_wins() {
        let (mut state, sink) = canvas();
        let b = batch(
            vec![Pixel::new(4, 4, "#000001"), Pixel::new(4, 4, "#000002")],
            100,
        );
        assert_eq!(state.apply_batch(&b, &id("e1"), true), 1);
        assert_eq!(state.get(CellCoord::new(4, 4)).unwrap().color, "#000002");
        assert_eq!(sink.changes().len(), 1);
    }

    #[test]
    fn test_out_of_world_pixels_are_skipped() {
        let (mut state, _sink) = canvas();
        let b = batch(vec![Pixel::new(-1, 0, "#ffffff"), Pixel::new(16, 0, "#ffffff")], 1);
        assert_eq!(state.apply_batch(&b, &id("e1"), true), 0);
        assert!(state.is_empty());
        assert!(!state.apply(
            CellCoord::new(99, 0),
            CellPaint {
                color: "#ffffff".into(),
                event_id: id("e2"),
                author: String::new(),
                timestamp: 1,
                valid: true,
            }
        ));
    }

    #[test]
    fn test_provisional_paint_is_free_and_upgradable() {
        let (mut state, sink) = canvas();
        let b = batch(vec![Pixel::new(5, 5, "#abcdef")], 100);
        assert_eq!(state.apply_batch(&b, &id("mine"), false), 1);
        assert_eq!(state.existing_timestamp(CellCoord::new(5, 5)), None);
        assert_eq!(state.provisional_events(), 1);

        assert_eq!(state.apply_batch(&b, &id("mine"), true), 1);
        assert!(state.get(CellCoord::new(5, 5)).unwrap().valid);
        assert_eq!(state.provisional_events(), 0);
        assert_eq!(sink.changes().len(), 2);
        // Nothing left to revert once settled.
        assert_eq!(state.revert(&id("mine")), 0);
    }

    #[test]
    fn test_provisional_never_evicts_settled() {
        let (mut state, _sink) = canvas();
        state.apply_batch(&batch(vec![Pixel::new(6, 6, "#000000")], 100), &id("paid"), true);
        assert_eq!(
            state.apply_batch(&batch(vec![Pixel::new(6, 6, "#ffffff")], 500), &id("mine"), false),
            0
        );
        assert_eq!(state.get(CellCoord::new(6, 6)).unwrap().event_id, id("paid"));
    }

    #[test]
    fn test_revert_clears_only_cells_still_held() {
        let (mut state, sink) = canvas();
        let mine = batch(
            vec![Pixel::new(7, 7, "#010101"), Pixel::new(8, 8, "#020202")],
            100,
        );
        state.apply_batch(&mine, &id("mine"), false);
        // Someone else's settled paint takes one of the cells.
        state.apply_batch(&batch(vec![Pixel::new(8, 8, "#030303")], 50), &id("paid"), true);
        sink.take();

        assert_eq!(state.revert(&id("mine")), 1);
        assert!(state.get(CellCoord::new(7, 7)).is_none());
        assert_eq!(state.get(CellCoord::new(8, 8)).unwrap().event_id, id("paid"));
        assert_eq!(
            sink.changes(),
            vec![CellChange::Cleared {
                coord: CellCoord::new(7, 7)
            }]
        );
        assert_eq!(state.provisional_events(), 0);
    }
}
