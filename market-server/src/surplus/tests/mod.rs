use super::*;
use crate::store::{BatchOp, MemoryStore, RedbStore};
use serde_json::json;
use shared::models::{Role, Unit};
use shared::util::now_millis;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn create_test_manager() -> SurplusManager {
    SurplusManager::new(
        Arc::new(RedbStore::open_in_memory().unwrap()),
        Duration::from_secs(24 * 3600),
    )
}

fn seller() -> Actor {
    Actor::new("v1", "Ravi", "+919800000001", Role::Vendor)
}

fn buyer(n: u32) -> Actor {
    Actor::new(format!("b{n}"), format!("Buyer {n}"), format!("+9198000001{n:02}"), Role::Vendor)
}

fn listing(quantity: f64, price: f64, original_price: Option<f64>) -> SurplusCreate {
    SurplusCreate {
        id: None,
        name: "Tomatoes".to_string(),
        description: None,
        category: "vegetables".to_string(),
        quality: None,
        unit: Unit::Kg,
        quantity,
        price,
        original_price,
        min_quantity: None,
        max_quantity: None,
        location: "Hadapsar, Pune".to_string(),
        address: None,
        expiry_date: now_millis() + DAY_MS,
    }
}

async fn create_test_item(manager: &SurplusManager) -> String {
    manager
        .create_surplus_item(listing(10.0, 20.0, Some(25.0)), &seller())
        .await
        .unwrap()
}

mod test_reserve;
