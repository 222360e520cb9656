//! Dashboard rollups, one shape per role

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::role::Role;
use super::user::PlatformStats;

/// One usage event in the best-effort analytics log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: String,
    pub user_id: String,
    pub user_role: Role,
    /// Event name, e.g. `order_created` or `dashboard_viewed`
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
    pub session_id: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsEventCreate {
    pub event: String,
    pub data: Option<serde_json::Value>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorDashboard {
    pub orders_placed: u64,
    pub open_orders: u64,
    pub total_spent: f64,
    pub groups_joined: u64,
    pub active_surplus_listings: u64,
    pub surplus_revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierDashboard {
    pub orders_handled: u64,
    pub orders_delivered: u64,
    pub revenue: f64,
    /// Delivered / handled, as a percentage
    pub completion_rate: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub platform: PlatformStats,
    pub total_groups: u64,
    pub total_orders: u64,
    pub orders_by_status: BTreeMap<String, u64>,
    pub total_surplus_listings: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    Vendor(VendorDashboard),
    Supplier(SupplierDashboard),
    Admin(AdminDashboard),
}
