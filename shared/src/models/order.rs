//! Order Model

use serde::{Deserialize, Serialize};

use super::role::Actor;

/// Order status
///
/// Fulfillment pipeline, in order:
/// draft → pending → quoted → confirmed → processing → packed → shipped → in_transit → delivered.
/// `cancelled` branches off any open status, `returned` only off `delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Pending,
    Quoted,
    Confirmed,
    Processing,
    Packed,
    Shipped,
    InTransit,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub const PIPELINE: [OrderStatus; 9] = [
        OrderStatus::Draft,
        OrderStatus::Pending,
        OrderStatus::Quoted,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::InTransit,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::Quoted => "quoted",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Packed => "packed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Returned => "returned",
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Returned
        )
    }

    /// Position in the fulfillment pipeline (`None` for the side branches)
    pub fn stage(&self) -> Option<usize> {
        Self::PIPELINE.iter().position(|s| s == self)
    }

    /// Whether `next` is reachable from `self`.
    ///
    /// Forward moves may skip stages but never go back. Repeating an open
    /// status is allowed so suppliers can post progress notes (e.g. a new
    /// location while in transit).
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (self, next) {
            (OrderStatus::Delivered, OrderStatus::Returned) => true,
            (OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Returned, _) => false,
            (_, OrderStatus::Cancelled) => true,
            (_, OrderStatus::Returned) => false,
            (current, next) => match (current.stage(), next.stage()) {
                (Some(from), Some(to)) => to >= from,
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    AdvancePaid,
    PartiallyPaid,
    Paid,
    Refunded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Upi,
    BankTransfer,
    Card,
}

/// Quality tier of a line item or surplus listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Premium,
    #[default]
    Standard,
    Economy,
}

/// Units accepted on order items and surplus listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    G,
    L,
    Ml,
    Pieces,
    Packets,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "l",
            Unit::Ml => "ml",
            Unit::Pieces => "pieces",
            Unit::Packets => "packets",
        }
    }
}

/// Line item (owned by its order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: Unit,
    pub quality: Quality,
    pub estimated_price: f64,
    pub quoted_price: Option<f64>,
    pub final_price: Option<f64>,
    pub is_substitutable: bool,
    pub notes: Option<String>,
}

/// Line item as submitted by the vendor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub quantity: f64,
    pub unit: Unit,
    pub quality: Option<Quality>,
    pub estimated_price: f64,
    pub is_substitutable: Option<bool>,
    pub notes: Option<String>,
}

/// Immutable status history record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: String,
    pub status: OrderStatus,
    pub timestamp: i64,
    pub note: Option<String>,
    pub updated_by: Actor,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub location: Option<String>,
    pub estimated_time: Option<String>,
    pub quoted_amount: Option<f64>,
    pub is_public: bool,
    pub notification_sent: bool,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub group_id: String,
    pub group_name: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub vendor_phone: String,
    pub supplier_id: Option<String>,
    pub supplier_name: Option<String>,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub priority: Priority,
    pub total_amount: f64,
    pub quoted_amount: Option<f64>,
    pub final_amount: Option<f64>,
    pub delivery_date: Option<i64>,
    pub delivery_location: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_instructions: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub timeline: Vec<TimelineEntry>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Amount the vendor is expected to pay, best known figure first
    pub fn payable_amount(&self) -> f64 {
        self.final_amount
            .or(self.quoted_amount)
            .unwrap_or(self.total_amount)
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    /// Caller-chosen id, makes a retried create idempotent
    pub id: Option<String>,
    pub group_id: String,
    pub items: Vec<OrderItemInput>,
    pub priority: Option<Priority>,
    pub delivery_date: Option<i64>,
    pub delivery_location: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_instructions: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

/// Extra data recorded alongside a status change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdateOptions {
    pub note: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub location: Option<String>,
    pub estimated_time: Option<String>,
    pub quoted_amount: Option<f64>,
    pub is_public: Option<bool>,
}

/// Status change request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    #[serde(flatten)]
    pub options: StatusUpdateOptions,
}

/// Listing filters. `user_id` is matched against the vendor or the
/// supplier side depending on `role`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilters {
    pub user_id: Option<String>,
    pub role: Option<super::role::Role>,
    pub status: Option<OrderStatus>,
    pub group_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}
