//! # Payment Settlement
//!
//! Paid placements only become visible once a receipt for their payment
//! request is seen, whichever of the two arrives first.

#[cfg(test)]
mod tests {
    use client_runtime::PaymentStatus;
    use shared_crypto::EventKeys;
    use shared_types::{unix_now, CellCoord, Pixel, PlacementBatch};

    use zp_05_relay_pool::ClientMessage;

    use crate::fixtures::{eventually, World, LIVE_SUBSCRIPTION, RELAY_A, RELAY_B};

    #[tokio::test]
    async fn test_receipt_before_placement_settles() {
        let world = World::new();
        let client = world.start().await.unwrap();
        assert!(world.live_on(RELAY_A).await);

        let painter = EventKeys::generate();
        let now = unix_now();
        let placement = world.placement(&painter, vec![Pixel::new(2, 3, "#ff00ff")], 1_000, true, now);
        let request = world.payment_request(&painter, &placement, 1_000, now);
        let receipt = world.receipt(&EventKeys::generate(), &request, now);

        world.network.inject(RELAY_A, receipt);
        world.network.inject(RELAY_B, placement);
        assert!(eventually(|| client.cell(CellCoord::new(2, 3)).is_some_and(|p| p.valid)).await);
        assert_eq!(client.pending_placements(), 0);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_placement_waits_for_its_receipt() {
        let world = World::new();
        let client = world.start().await.unwrap();
        assert!(world.live_on(RELAY_A).await);

        let painter = EventKeys::generate();
        let now = unix_now();
        let placement = world.placement(&painter, vec![Pixel::new(4, 4, "#123123")], 1_000, true, now);
        world.network.inject(RELAY_A, placement.clone());
        assert!(eventually(|| client.pending_placements() == 1).await);
        assert!(client.cell(CellCoord::new(4, 4)).is_none());

        let request = world.payment_request(&painter, &placement, 1_000, now);
        world
            .network
            .inject(RELAY_A, world.receipt(&EventKeys::generate(), &request, now + 1));
        assert!(eventually(|| client.cell(CellCoord::new(4, 4)).is_some()).await);
        assert_eq!(client.pending_placements(), 0);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_untrusted_issuer_does_not_settle() {
        let mut world = World::new();
        let trusted = EventKeys::generate();
        world.config.receipts.trusted_issuers = vec![trusted.public_key_hex()];
        let client = world.start().await.unwrap();
        assert!(world.live_on(RELAY_A).await);

        let painter = EventKeys::generate();
        let now = unix_now();
        let placement = world.placement(&painter, vec![Pixel::new(6, 1, "#aa00aa")], 1_000, true, now);
        let request = world.payment_request(&painter, &placement, 1_000, now);
        world.network.inject(RELAY_A, placement);
        world
            .network
            .inject(RELAY_A, world.receipt(&EventKeys::generate(), &request, now));
        world.network.inject(RELAY_A, world.receipt(&trusted, &request, now + 1));

        assert!(eventually(|| client.cell(CellCoord::new(6, 1)).is_some()).await);
        assert_eq!(client.pending_placements(), 0);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_second_client_sees_settled_submission() {
        let world = World::new();
        let author = world.start().await.unwrap();
        let observer = world.start().await.unwrap();
        let live_reqs = || {
            world
                .network
                .requests(RELAY_A)
                .iter()
                .filter(|m| matches!(m, ClientMessage::Req { subscription_id, .. } if subscription_id == LIVE_SUBSCRIPTION))
                .count()
        };
        assert!(eventually(|| live_reqs() >= 2).await);

        let submission = author
            .submit(PlacementBatch::new(vec![Pixel::new(10, 10, "#c0ffee")], 1_000))
            .await
            .unwrap();
        assert!(matches!(submission.payment, PaymentStatus::Paid { .. }));
        assert!(eventually(|| observer.pending_placements() == 1).await);
        assert!(observer.cell(CellCoord::new(10, 10)).is_none());
        assert!(!author.cell(CellCoord::new(10, 10)).unwrap().valid);

        let (_, request) = world.invoices.requests().remove(0);
        world
            .network
            .inject(RELAY_B, world.receipt(&EventKeys::generate(), &request, unix_now()));

        for client in [&author, &observer] {
            assert!(eventually(|| client.cell(CellCoord::new(10, 10)).is_some_and(|p| p.valid)).await);
        }
        author.shutdown().await;
        observer.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_prices_repaints() {
        let world = World::new();
        let painter = EventKeys::generate();
        let old = world.placement(&painter, vec![Pixel::new(1, 2, "#101010")], 1_000, false, unix_now() - 700_000);
        world.store_everywhere(&old);
        let client = world.start().await.unwrap();

        let pixels = vec![Pixel::new(1, 2, "#202020")];
        let quote = client.quote(&pixels);
        assert_eq!(quote.total, 1_000);

        let submission = client
            .submit(PlacementBatch::new(pixels, quote.total))
            .await
            .unwrap();
        assert_eq!(submission.provisional_cells, 1);
        assert_eq!(world.invoices.requests()[0].0, 1_000);
        client.shutdown().await;
    }
}
