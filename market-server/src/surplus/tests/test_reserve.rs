use super::*;

#[tokio::test]
async fn test_reserve_until_sold_out() {
    let manager = create_test_manager();
    let id = create_test_item(&manager).await;

    let (item, first) = manager.reserve(&id, &buyer(1), 4.0, None).await.unwrap();
    assert_eq!(item.remaining_quantity, 6.0);
    assert_eq!(item.status, SurplusStatus::PartiallySold);
    assert_eq!(first.id, "reservation_1");
    assert_eq!(first.buyer_id, "b1");
    assert_eq!(first.expires_at - first.reserved_at, 24 * 3600 * 1000);

    let (item, second) = manager.reserve(&id, &buyer(2), 6.0, None).await.unwrap();
    assert_eq!(item.remaining_quantity, 0.0);
    assert_eq!(item.status, SurplusStatus::Sold);
    assert_eq!(second.id, "reservation_2");
    assert_eq!(item.reservations.len(), 2);

    let err = manager.reserve(&id, &buyer(3), 1.0, None).await.unwrap_err();
    assert!(matches!(
        err,
        MarketError::InsufficientQuantity {
            requested: 1.0,
            remaining: 0.0,
            ..
        }
    ));

    let stored = manager.get_item(&id).await.unwrap();
    assert_eq!(stored.original_quantity, 10.0);
    assert_eq!(stored.reservations.len(), 2);
}

#[tokio::test]
async fn test_over_reservation_changes_nothing() {
    let manager = create_test_manager();
    let id = create_test_item(&manager).await;
    manager.reserve(&id, &buyer(1), 7.0, None).await.unwrap();

    let err = manager.reserve(&id, &buyer(2), 3.5, None).await.unwrap_err();
    assert_eq!(err.kind(), "insufficient_quantity");

    let item = manager.get_item(&id).await.unwrap();
    assert_eq!(item.remaining_quantity, 3.0);
    assert_eq!(item.reservations.len(), 1);
}

#[tokio::test]
async fn test_reservation_limits() {
    let manager = create_test_manager();
    let mut data = listing(10.0, 20.0, None);
    data.min_quantity = Some(2.0);
    data.max_quantity = Some(5.0);
    let id = manager.create_surplus_item(data, &seller()).await.unwrap();

    for quantity in [0.0, -1.0, f64::INFINITY, 1.5, 5.5] {
        let err = manager.reserve(&id, &buyer(1), quantity, None).await.unwrap_err();
        assert_eq!(err.kind(), "validation", "quantity {quantity}");
    }

    manager.reserve(&id, &buyer(1), 5.0, None).await.unwrap();
    manager.reserve(&id, &buyer(2), 3.5, None).await.unwrap();
    // 1.5 left: below the minimum, but it is the whole remainder
    let (item, _) = manager.reserve(&id, &buyer(3), 1.5, None).await.unwrap();
    assert_eq!(item.status, SurplusStatus::Sold);
}

#[tokio::test]
async fn test_fractional_quantities_sell_out_exactly() {
    let manager = create_test_manager();
    let mut data = listing(1.0, 20.0, None);
    data.min_quantity = Some(0.1);
    let id = manager.create_surplus_item(data, &seller()).await.unwrap();

    for n in 0..10 {
        manager.reserve(&id, &buyer(n), 0.1, None).await.unwrap();
    }
    let item = manager.get_item(&id).await.unwrap();
    assert_eq!(item.remaining_quantity, 0.0);
    assert_eq!(item.status, SurplusStatus::Sold);
}

#[tokio::test]
async fn test_reservations_account_for_every_unit() {
    let manager = create_test_manager();
    let mut data = listing(10.0, 20.0, None);
    data.min_quantity = Some(0.001);
    let id = manager.create_surplus_item(data, &seller()).await.unwrap();

    // Finer than the quantity scale: rejected, nothing recorded
    for quantity in [0.0001, 9.9999] {
        let err = manager.reserve(&id, &buyer(1), quantity, None).await.unwrap_err();
        assert_eq!(err.kind(), "validation", "quantity {quantity}");
    }
    let item = manager.get_item(&id).await.unwrap();
    assert_eq!(item.remaining_quantity, 10.0);
    assert!(item.reservations.is_empty());

    for (n, quantity) in [2.125, 0.875, 3.333, 0.001, 1.666].into_iter().enumerate() {
        let (item, _) = manager.reserve(&id, &buyer(n as u32), quantity, None).await.unwrap();
        let reserved: rust_decimal::Decimal = item
            .reservations
            .iter()
            .map(|r| money::to_decimal(r.quantity))
            .sum();
        assert_eq!(
            reserved,
            money::to_decimal(item.original_quantity) - money::to_decimal(item.remaining_quantity)
        );
    }

    let (item, _) = manager.reserve(&id, &buyer(9), 2.0, None).await.unwrap();
    assert_eq!(item.remaining_quantity, 0.0);
    assert_eq!(item.status, SurplusStatus::Sold);
}

#[tokio::test]
async fn test_cannot_reserve_own_or_withdrawn() {
    let manager = create_test_manager();
    let id = create_test_item(&manager).await;

    let err = manager.reserve(&id, &seller(), 1.0, None).await.unwrap_err();
    assert_eq!(err.kind(), "permission_denied");

    manager.withdraw(&id, "v1").await.unwrap();
    let err = manager.reserve(&id, &buyer(1), 1.0, None).await.unwrap_err();
    assert!(matches!(
        err,
        MarketError::Unavailable {
            status: SurplusStatus::Withdrawn,
            ..
        }
    ));
}

#[tokio::test]
async fn test_explicit_reservation_expiry() {
    let manager = create_test_manager();
    let id = create_test_item(&manager).await;
    let until = now_millis() + 2 * 3600 * 1000;

    let (_, reservation) = manager.reserve(&id, &buyer(1), 2.0, Some(until)).await.unwrap();
    assert_eq!(reservation.expires_at, until);

    let err = manager
        .reserve(&id, &buyer(1), 2.0, Some(now_millis() - 5))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservations_never_oversell() {
    let manager = create_test_manager();
    let id = create_test_item(&manager).await;

    let tasks: Vec<_> = (0..12)
        .map(|n| {
            let manager = manager.clone();
            let id = id.clone();
            tokio::spawn(async move { manager.reserve(&id, &buyer(n), 1.0, None).await })
        })
        .collect();

    let mut accepted = 0;
    for result in futures::future::join_all(tasks).await {
        match result.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => assert_eq!(e.kind(), "insufficient_quantity"),
        }
    }
    assert_eq!(accepted, 10);

    let item = manager.get_item(&id).await.unwrap();
    assert_eq!(item.remaining_quantity, 0.0);
    assert_eq!(item.reservations.len(), 10);
    assert_eq!(item.status, SurplusStatus::Sold);
}
