//! Notification Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::order::Priority;
use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Order,
    Group,
    Surplus,
    Payment,
    System,
    Promotion,
    Alert,
    Reminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Order => "order",
            NotificationKind::Group => "group",
            NotificationKind::Surplus => "surplus",
            NotificationKind::Payment => "payment",
            NotificationKind::System => "system",
            NotificationKind::Promotion => "promotion",
            NotificationKind::Alert => "alert",
            NotificationKind::Reminder => "reminder",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    Urgent,
}

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    App,
    Email,
    Sms,
    Whatsapp,
    Push,
}

/// Notification entity
///
/// Only `is_read`, `read_at` and `is_archived` change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub user_role: Role,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub category: NotificationCategory,
    pub title: String,
    pub message: String,
    pub data: Option<Value>,
    pub priority: Priority,
    pub channels: Vec<Channel>,
    pub related_entity_id: Option<String>,
    pub related_entity_type: Option<String>,
    pub is_read: bool,
    pub is_archived: bool,
    pub created_at: i64,
    pub read_at: Option<i64>,
}

/// Create notification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreate {
    pub user_id: String,
    pub user_role: Role,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub category: NotificationCategory,
    pub title: String,
    pub message: String,
    pub data: Option<Value>,
    #[serde(default)]
    pub priority: Priority,
    pub channels: Vec<Channel>,
    pub related_entity_id: Option<String>,
    pub related_entity_type: Option<String>,
}

/// Page of notifications plus the user's total unread count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub has_more: bool,
    pub total: usize,
    /// Counted over all of the user's notifications, ignoring filters
    pub unread_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationFilters {
    #[serde(rename = "type")]
    pub kind: Option<NotificationKind>,
    pub is_read: Option<bool>,
    /// Archived notifications are hidden unless asked for
    #[serde(default)]
    pub include_archived: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}
