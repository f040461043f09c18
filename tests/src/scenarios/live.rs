//! # Live Feed
//!
//! After startup every relay carries one standing subscription. Events
//! arriving on several relays are painted once, connection drops and
//! relay-side closes both bring the subscription back.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared_crypto::EventKeys;
    use shared_types::{unix_now, CellChange, CellCoord, Pixel};

    use crate::fixtures::{eventually, World, LIVE_SUBSCRIPTION, RELAY_A, RELAY_B};

    #[tokio::test]
    async fn test_event_on_both_relays_is_painted_once() {
        let world = World::new();
        let client = world.start().await.unwrap();
        let mut changes = client.subscribe_changes();
        assert!(world.live_on(RELAY_A).await);
        assert!(world.live_on(RELAY_B).await);

        let painter = EventKeys::generate();
        let event = world.placement(&painter, vec![Pixel::new(3, 4, "#00ff00")], 1_000, false, unix_now());
        world.network.inject(RELAY_A, event.clone());
        world.network.inject(RELAY_B, event);

        let change = tokio::time::timeout(Duration::from_secs(2), changes.recv())
            .await
            .unwrap()
            .unwrap();
        match change {
            CellChange::Painted { coord, paint } => {
                assert_eq!(coord, CellCoord::new(3, 4));
                assert_eq!(paint.color, "#00ff00");
                assert!(paint.valid);
            }
            other => panic!("expected a paint, got {other:?}"),
        }

        // A marker event proves the duplicate was already drained.
        let marker = world.placement(&painter, vec![Pixel::new(9, 9, "#000000")], 1_000, false, unix_now());
        world.network.inject(RELAY_B, marker);
        let next = tokio::time::timeout(Duration::from_secs(2), changes.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next.coord(), CellCoord::new(9, 9));
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_forged_event_never_paints() {
        let world = World::new();
        let client = world.start().await.unwrap();
        assert!(world.live_on(RELAY_A).await);

        let painter = EventKeys::generate();
        let now = unix_now();
        let genuine = world.placement(&painter, vec![Pixel::new(1, 1, "#ff0000")], 1_000, false, now);
        let other = world.placement(&painter, vec![Pixel::new(2, 2, "#0000ff")], 1_000, false, now);
        let mut forged = genuine.clone();
        forged.content = other.content.clone();

        world.network.inject(RELAY_A, forged);
        world.network.inject(RELAY_A, other);
        assert!(eventually(|| client.cell(CellCoord::new(2, 2)).is_some()).await);
        assert!(client.cell(CellCoord::new(1, 1)).is_none());
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_older_paint_does_not_overwrite() {
        let world = World::new();
        let client = world.start().await.unwrap();
        assert!(world.live_on(RELAY_A).await);

        let painter = EventKeys::generate();
        let now = unix_now();
        let newer = world.placement(&painter, vec![Pixel::new(5, 5, "#eeeeee")], 1_000, false, now);
        world.network.inject(RELAY_A, newer);
        assert!(eventually(|| client.cell(CellCoord::new(5, 5)).is_some()).await);

        let older = world.placement(&painter, vec![Pixel::new(5, 5, "#0a0a0a")], 10_000, false, now - 5);
        let marker = world.placement(&painter, vec![Pixel::new(6, 6, "#000000")], 1_000, false, now);
        world.network.inject(RELAY_A, older);
        world.network.inject(RELAY_A, marker);
        assert!(eventually(|| client.cell(CellCoord::new(6, 6)).is_some()).await);
        assert_ne!(client.cell(CellCoord::new(5, 5)).unwrap().color, "#0a0a0a");
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_dropped_connection_restores_subscription() {
        let world = World::new();
        let client = world.start().await.unwrap();
        assert!(world.live_on(RELAY_A).await);
        let attempts = world.network.connect_attempts(RELAY_A);

        world.network.drop_connections(RELAY_A);
        assert!(eventually(|| world.network.connect_attempts(RELAY_A) > attempts).await);
        assert!(world.live_on(RELAY_A).await);

        let painter = EventKeys::generate();
        let event = world.placement(&painter, vec![Pixel::new(7, 7, "#abcdef")], 1_000, false, unix_now());
        world.network.inject(RELAY_A, event);
        assert!(eventually(|| client.cell(CellCoord::new(7, 7)).is_some()).await);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_relay_side_close_is_reissued() {
        let world = World::new();
        let client = world.start().await.unwrap();
        assert!(world.live_on(RELAY_A).await);

        world
            .network
            .close_subscription(RELAY_A, LIVE_SUBSCRIPTION, "rate-limited: slow down");
        assert!(world.live_on(RELAY_A).await);

        let painter = EventKeys::generate();
        let event = world.placement(&painter, vec![Pixel::new(8, 8, "#fedcba")], 1_000, false, unix_now());
        world.network.inject(RELAY_A, event);
        assert!(eventually(|| client.cell(CellCoord::new(8, 8)).is_some()).await);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_closes_live_subscription() {
        let world = World::new();
        let client = world.start().await.unwrap();
        assert!(world.live_on(RELAY_A).await);
        client.shutdown().await;
        assert!(world.network.live_subscriptions(RELAY_A).is_empty());
    }
}
