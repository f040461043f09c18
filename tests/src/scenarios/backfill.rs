//! # Startup Backfill
//!
//! History is fetched page by page from every connected relay, merged,
//! de-duplicated and replayed oldest first before the live feed opens.

#[cfg(test)]
mod tests {
    use shared_crypto::EventKeys;
    use shared_types::{unix_now, CellCoord, Pixel};

    use crate::fixtures::{World, RELAY_A, RELAY_B};

    #[tokio::test]
    async fn test_backfill_walks_every_page() {
        let world = World::new();
        let painter = EventKeys::generate();
        let now = unix_now();

        // Seven distinct cells across pages of three.
        for i in 0..7u64 {
            let event = world.placement(
                &painter,
                vec![Pixel::new(i as i64, 0, "#ff0000")],
                1_000,
                false,
                now - 1_000 + i * 10,
            );
            world.network.store(RELAY_A, event);
        }

        let client = world.start().await.unwrap();
        assert_eq!(client.startup().history_events, 7);
        assert_eq!(client.startup().applied, 7);
        assert_eq!(client.painted_cells(), 7);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_same_event_on_two_relays_counts_once() {
        let world = World::new();
        let painter = EventKeys::generate();
        let now = unix_now();
        let only_a = world.placement(&painter, vec![Pixel::new(1, 1, "#111111")], 1_000, false, now - 60);
        let shared = world.placement(&painter, vec![Pixel::new(2, 2, "#222222")], 1_000, false, now - 50);
        let only_b = world.placement(&painter, vec![Pixel::new(3, 3, "#333333")], 1_000, false, now - 40);
        world.network.store(RELAY_A, only_a);
        world.store_everywhere(&shared);
        world.network.store(RELAY_B, only_b);

        let client = world.start().await.unwrap();
        assert_eq!(client.startup().history_events, 3);
        assert_eq!(client.painted_cells(), 3);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_replay_resolves_overwrites_in_time_order() {
        let world = World::new();
        let painter = EventKeys::generate();
        let now = unix_now();
        let first = world.placement(&painter, vec![Pixel::new(4, 4, "#aaaaaa")], 1_000, false, now - 7_200);
        // Repainting a cell painted two hours earlier costs the aging price.
        let second = world.placement(&painter, vec![Pixel::new(4, 4, "#bbbbbb")], 5_000, false, now - 100);
        world.network.store(RELAY_A, second);
        world.network.store(RELAY_B, first);

        let client = world.start().await.unwrap();
        let paint = client.cell(CellCoord::new(4, 4)).unwrap();
        assert_eq!(paint.color, "#bbbbbb");
        assert_eq!(client.startup().applied, 2);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_underpaid_history_is_rejected() {
        let world = World::new();
        let painter = EventKeys::generate();
        let now = unix_now();
        let first = world.placement(&painter, vec![Pixel::new(5, 5, "#aaaaaa")], 1_000, false, now - 600);
        let cheap_repaint = world.placement(&painter, vec![Pixel::new(5, 5, "#cccccc")], 1_000, false, now - 300);
        world.store_everywhere(&first);
        world.store_everywhere(&cheap_repaint);

        let client = world.start().await.unwrap();
        assert_eq!(client.startup().applied, 1);
        assert_eq!(client.startup().rejected, 1);
        assert_eq!(client.cell(CellCoord::new(5, 5)).unwrap().color, "#aaaaaa");
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_starts_with_one_relay_down() {
        let world = World::new();
        world.network.refuse(RELAY_B);
        let painter = EventKeys::generate();
        let event = world.placement(&painter, vec![Pixel::new(6, 6, "#123456")], 1_000, false, unix_now() - 30);
        world.network.store(RELAY_A, event);

        let client = world.start().await.unwrap();
        assert_eq!(client.painted_cells(), 1);
        assert!(client.startup().failed_sources.is_empty());
        let connected: Vec<String> = client
            .statuses()
            .into_iter()
            .filter(|r| r.is_connected())
            .map(|r| r.url)
            .collect();
        assert_eq!(connected, vec![RELAY_A.to_string()]);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_events_for_other_canvases_are_not_fetched() {
        let world = World::new();
        let painter = EventKeys::generate();
        let foreign_codec = zp_02_codec::PlacementCodec::new("ef".repeat(32), vec![]);
        let unsigned = foreign_codec
            .encode_placement(
                &shared_types::PlacementBatch::new(vec![Pixel::new(7, 7, "#ffffff")], 1_000),
                false,
                unix_now() - 20,
            )
            .unwrap();
        world.store_everywhere(&painter.sign_event(unsigned).unwrap());

        let client = world.start().await.unwrap();
        assert_eq!(client.startup().history_events, 0);
        assert_eq!(client.painted_cells(), 0);
        client.shutdown().await;
    }
}
