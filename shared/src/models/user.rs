//! User Profile Model

use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub notifications: bool,
    pub whatsapp_updates: bool,
    pub email_updates: bool,
    pub language: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            notifications: true,
            whatsapp_updates: true,
            email_updates: false,
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_orders: u64,
    pub total_savings: f64,
    pub groups_joined: u64,
    pub surplus_shared: u64,
}

/// User profile entity, keyed by the authenticated uid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub phone: String,
    pub role: Role,
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub business_name: Option<String>,
    pub gst_number: Option<String>,
    /// Product categories a supplier stocks
    #[serde(default)]
    pub categories: Vec<String>,
    /// Average buyer rating, 0 until rated
    #[serde(default)]
    pub rating: f64,
    pub is_verified: bool,
    pub is_active: bool,
    /// Percentage (0-100) of name, email, location, business name filled in
    pub profile_completeness: u8,
    pub preferences: UserPreferences,
    pub stats: UserStats,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.phone)
    }
}

/// Fields a user may set on their own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub business_name: Option<String>,
    pub gst_number: Option<String>,
    pub categories: Option<Vec<String>>,
    pub preferences: Option<UserPreferences>,
}

/// Supplier directory query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierFilters {
    /// Case-insensitive substring of the supplier's location
    pub location: Option<String>,
    /// Supplier stocks this category
    pub category: Option<String>,
    pub min_rating: Option<f64>,
    pub is_verified: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Platform-wide user counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_vendors: u64,
    pub total_suppliers: u64,
    pub total_admins: u64,
    pub updated_at: i64,
}

impl PlatformStats {
    pub fn count_for(&self, role: Role) -> u64 {
        match role {
            Role::Vendor => self.total_vendors,
            Role::Supplier => self.total_suppliers,
            Role::Admin => self.total_admins,
        }
    }

    pub fn record_signup(&mut self, role: Role) {
        self.total_users += 1;
        match role {
            Role::Vendor => self.total_vendors += 1,
            Role::Supplier => self.total_suppliers += 1,
            Role::Admin => self.total_admins += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_signup() {
        let mut stats = PlatformStats::default();
        stats.record_signup(Role::Vendor);
        stats.record_signup(Role::Vendor);
        stats.record_signup(Role::Supplier);

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.count_for(Role::Vendor), 2);
        assert_eq!(stats.count_for(Role::Supplier), 1);
        assert_eq!(stats.count_for(Role::Admin), 0);
    }
}
