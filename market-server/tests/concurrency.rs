//! Concurrent writers against one document

mod common;

use std::sync::Arc;

use common::*;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use market_server::MarketError;
use market_server::auth::JwtConfig;
use market_server::messaging::LogMessageSender;
use market_server::store::RedbStore;
use market_server::{Config, JwtService, ServerState};
use shared::models::{GroupStatus, SurplusStatus};

const JOINERS: u32 = 20;

async fn join_race(state: ServerState, max_members: u32) {
    let id = state
        .groups
        .create_group(group_input("Sector 5 Veggies", Some(max_members)), &vendor(0))
        .await
        .unwrap();

    let handles: Vec<_> = (1..=JOINERS)
        .map(|n| {
            let groups = state.groups.clone();
            let id = id.clone();
            tokio::spawn(async move { groups.join_group(&id, &vendor(n)).await })
        })
        .collect();
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let joined = results.iter().filter(|r| r.is_ok()).count();
    let full = results
        .iter()
        .filter(|r| matches!(r, Err(MarketError::GroupFull { .. })))
        .count();
    assert_eq!(joined, (max_members - 1) as usize);
    assert_eq!(joined + full, JOINERS as usize);

    let group = state.groups.get_group(&id).await.unwrap();
    assert_eq!(group.member_count(), max_members as usize);
    assert_eq!(group.member_details.len(), max_members as usize);
    assert_eq!(group.status, GroupStatus::Full);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_memory_store() {
    join_race(create_test_state(), 6).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_redb_store() {
    let jwt = JwtService::with_config(JwtConfig::with_secret(TEST_SECRET).unwrap());
    let state = ServerState::with_store(
        Config::demo(),
        Arc::new(RedbStore::open_in_memory().unwrap()),
        jwt,
        Arc::new(LogMessageSender),
    );
    join_race(state, 4).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservations_never_oversell() {
    let state = create_test_state();
    let item_id = state
        .surplus
        .create_surplus_item(surplus_input(10.0, 20.0, None), &vendor(0))
        .await
        .unwrap();

    let handles: Vec<_> = (1..=12)
        .map(|n| {
            let surplus = state.surplus.clone();
            let item_id = item_id.clone();
            tokio::spawn(async move { surplus.reserve(&item_id, &vendor(n), 2.0, None).await })
        })
        .collect();
    let reserved = join_all(handles)
        .await
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count();

    let item = state.surplus.get_item(&item_id).await.unwrap();
    assert_eq!(reserved, 5);
    assert_eq!(item.reservations.len(), 5);
    assert_eq!(item.remaining_quantity, 0.0);
    assert_eq!(item.status, SurplusStatus::Sold);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_random_reservations_keep_quantity_bounds() {
    let state = create_test_state();
    let mut rng = StdRng::seed_from_u64(7);

    for round in 0..5 {
        let original: f64 = rng.gen_range(5..=30) as f64;
        let item_id = state
            .surplus
            .create_surplus_item(surplus_input(original, 15.0, None), &vendor(0))
            .await
            .unwrap();

        let quantities: Vec<f64> = (0..16).map(|_| rng.gen_range(1..=6) as f64).collect();
        let handles: Vec<_> = quantities
            .into_iter()
            .enumerate()
            .map(|(n, quantity)| {
                let surplus = state.surplus.clone();
                let item_id = item_id.clone();
                let buyer = vendor(n as u32 + 1);
                tokio::spawn(async move { surplus.reserve(&item_id, &buyer, quantity, None).await })
            })
            .collect();
        join_all(handles).await;

        let item = state.surplus.get_item(&item_id).await.unwrap();
        let reserved: f64 = item.reservations.iter().map(|r| r.quantity).sum();
        assert!(
            (0.0..=original).contains(&item.remaining_quantity),
            "round {round}: remaining {} outside [0, {original}]",
            item.remaining_quantity
        );
        assert_eq!(reserved + item.remaining_quantity, original, "round {round}");
        if item.remaining_quantity == 0.0 {
            assert_eq!(item.status, SurplusStatus::Sold);
        }
    }
}
