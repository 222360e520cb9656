//! File-backed redb store through the full bootstrap

mod common;

use common::*;
use market_server::{Config, ServerState};
use shared::models::GroupFilters;

fn file_config(dir: &tempfile::TempDir) -> Config {
    Config {
        data_dir: dir.path().join("data").to_string_lossy().into_owned(),
        jwt_secret: Some(TEST_SECRET.to_string()),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_data_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir);

    let (group_id, order_id) = {
        let state = ServerState::initialize(&config).await.unwrap();
        assert_eq!(state.store.backend(), "redb");
        let group_id = state
            .groups
            .create_group(group_input("Sector 5 Veggies", None), &vendor(1))
            .await
            .unwrap();
        let order_id = state
            .orders
            .create_order(order_input(&group_id, &[("Onions", 25.0, 10.0)]), &vendor(1))
            .await
            .unwrap();
        (group_id, order_id)
    };
    assert!(config.database_path().exists());

    let state = ServerState::initialize(&config).await.unwrap();
    let group = state.groups.get_group(&group_id).await.unwrap();
    assert_eq!(group.stats.total_orders, 1);
    let order = state.orders.get_order(&order_id).await.unwrap();
    assert_eq!(order.total_amount, 250.0);

    let page = state
        .groups
        .list_groups(&GroupFilters::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_production_requires_secret() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        environment: "production".to_string(),
        jwt_secret: None,
        ..file_config(&dir)
    };
    assert!(ServerState::initialize(&config).await.is_err());
}
