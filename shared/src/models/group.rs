//! Buying Group Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    #[default]
    Active,
    Inactive,
    Full,
    Archived,
}

impl GroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStatus::Active => "active",
            GroupStatus::Inactive => "inactive",
            GroupStatus::Full => "full",
            GroupStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Member,
}

/// Roster entry keyed by member id in [`BuyingGroup::member_details`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub name: String,
    pub phone: String,
    pub joined_at: i64,
    pub role: MemberRole,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderFrequency {
    #[default]
    Weekly,
    Biweekly,
    Monthly,
}

/// Purchasing terms shared by all members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSettings {
    pub order_frequency: OrderFrequency,
    pub minimum_order: f64,
    pub delivery_radius_km: f64,
    pub payment_terms: String,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            order_frequency: OrderFrequency::Weekly,
            minimum_order: 500.0,
            delivery_radius_km: 5.0,
            payment_terms: "Cash on Delivery".to_string(),
        }
    }
}

/// Aggregate counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub total_orders: u64,
    pub total_savings: f64,
    pub average_savings: f64,
}

/// Buying group entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyingGroup {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub address: Option<String>,
    pub category: String,
    pub owner_id: String,
    pub owner_name: String,
    /// Member ids in join order, owner first
    pub members: Vec<String>,
    pub member_details: BTreeMap<String, GroupMember>,
    pub max_members: u32,
    pub status: GroupStatus,
    pub rules: Vec<String>,
    pub settings: GroupSettings,
    pub stats: GroupStats,
    pub created_at: i64,
    pub updated_at: i64,
}

impl BuyingGroup {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    pub fn has_capacity(&self) -> bool {
        self.members.len() < self.max_members as usize
    }
}

/// Create group payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyingGroupCreate {
    /// Caller-chosen id, makes a retried create idempotent
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub address: Option<String>,
    pub category: String,
    pub max_members: Option<u32>,
    pub rules: Option<Vec<String>>,
    pub settings: Option<GroupSettings>,
}

/// Administrative status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStatusUpdate {
    pub status: GroupStatus,
}

/// Listing filters (all optional, AND-ed)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupFilters {
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    pub category: Option<String>,
    pub status: Option<GroupStatus>,
    /// Only groups this user belongs to
    pub member_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}
