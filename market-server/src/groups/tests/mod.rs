use super::*;
use crate::store::{MemoryStore, RedbStore};
use shared::models::Role;

fn create_test_manager() -> GroupManager {
    GroupManager::new(Arc::new(RedbStore::open_in_memory().unwrap()))
}

fn create_demo_manager() -> GroupManager {
    GroupManager::new(Arc::new(MemoryStore::new()))
}

fn vendor(n: u32) -> Actor {
    Actor::new(
        format!("v{n}"),
        format!("Vendor {n}"),
        format!("+9198000000{n:02}"),
        Role::Vendor,
    )
}

fn group_data(name: &str, location: &str, max_members: Option<u32>) -> BuyingGroupCreate {
    BuyingGroupCreate {
        name: name.to_string(),
        location: location.to_string(),
        category: "vegetables".to_string(),
        max_members,
        ..Default::default()
    }
}

async fn create_test_group(manager: &GroupManager, max_members: Option<u32>) -> String {
    manager
        .create_group(group_data("Sector 5 Veggies", "Koregaon Park, Pune", max_members), &vendor(1))
        .await
        .unwrap()
}

mod test_listing;
