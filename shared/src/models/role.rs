//! Role Model
//!
//! Roles are a closed set; what each role may do is expressed as a fixed
//! capability set instead of string comparisons at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::order::OrderStatus;

/// Marketplace role carried in the identity token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Vendor,
    Supplier,
    Admin,
}

/// Role-scoped operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CreateOrder,
    CreateGroup,
    JoinGroup,
    CreateSurplus,
    ReserveSurplus,
    QuoteOrder,
    UpdateOrderStatus,
    ManageGroups,
    ViewAll,
    Verify,
}

const VENDOR_CAPABILITIES: &[Capability] = &[
    Capability::CreateOrder,
    Capability::CreateGroup,
    Capability::JoinGroup,
    Capability::CreateSurplus,
    Capability::ReserveSurplus,
];

const SUPPLIER_CAPABILITIES: &[Capability] =
    &[Capability::QuoteOrder, Capability::UpdateOrderStatus];

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ViewAll,
    Capability::Verify,
    Capability::ManageGroups,
    Capability::UpdateOrderStatus,
];

/// Statuses a vendor may set on their own orders
const VENDOR_ORDER_STATUSES: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Cancelled,
    OrderStatus::Returned,
];

impl Role {
    pub const ALL: [Role; 3] = [Role::Vendor, Role::Supplier, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Vendor => "vendor",
            Role::Supplier => "supplier",
            Role::Admin => "admin",
        }
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Vendor => VENDOR_CAPABILITIES,
            Role::Supplier => SUPPLIER_CAPABILITIES,
            Role::Admin => ADMIN_CAPABILITIES,
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Whether this role may move an order to `target`.
    ///
    /// `owns_order` is true when the actor is the order's vendor.
    pub fn may_set_order_status(&self, target: OrderStatus, owns_order: bool) -> bool {
        match self {
            Role::Vendor => owns_order && VENDOR_ORDER_STATUSES.contains(&target),
            Role::Supplier | Role::Admin => self.can(Capability::UpdateOrderStatus),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vendor" => Ok(Role::Vendor),
            "supplier" => Ok(Role::Supplier),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Who performed an action (recorded on timeline entries)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
}

impl Actor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            role,
        }
    }
}
