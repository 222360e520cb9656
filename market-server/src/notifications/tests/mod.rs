use super::*;
use crate::store::{MemoryStore, RedbStore};
use shared::models::{NotificationCategory, NotificationKind, Priority, Role};

fn create_test_manager() -> NotificationManager {
    NotificationManager::new(
        Arc::new(RedbStore::open_in_memory().unwrap()),
        Duration::from_secs(3600),
    )
}

fn create_demo_manager() -> NotificationManager {
    NotificationManager::new(Arc::new(MemoryStore::new()), Duration::from_secs(3600))
}

fn notice(user_id: &str, kind: NotificationKind, title: &str) -> NotificationCreate {
    NotificationCreate {
        user_id: user_id.to_string(),
        user_role: Role::Vendor,
        kind,
        category: NotificationCategory::Info,
        title: title.to_string(),
        message: format!("{title} body"),
        data: None,
        priority: Priority::Medium,
        channels: vec![Channel::App],
        related_entity_id: None,
        related_entity_type: None,
    }
}
