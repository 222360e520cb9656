use super::*;
use crate::store::{MemoryStore, RedbStore};

fn create_test_manager() -> ProfileManager {
    ProfileManager::new(Arc::new(RedbStore::open_in_memory().unwrap()))
}

fn create_demo_manager() -> ProfileManager {
    ProfileManager::new(Arc::new(MemoryStore::new()))
}

fn user(n: u32, role: Role) -> Actor {
    Actor::new(
        format!("u{n}"),
        format!("User {n}"),
        format!("+9197000000{n:02}"),
        role,
    )
}

fn full_details() -> ProfileUpdate {
    ProfileUpdate {
        name: Some("Ramesh Kumar".to_string()),
        email: Some("ramesh@example.in".to_string()),
        location: Some("Dadar, Mumbai".to_string()),
        business_name: Some("Ramesh Chaat Corner".to_string()),
        ..Default::default()
    }
}
