//! Manager-level error taxonomy
//!
//! Every manager operation returns [`MarketResult`]. Each variant has a
//! stable [`kind`](MarketError::kind) string and maps onto one
//! [`ErrorCode`] at the HTTP boundary.

use shared::error::{AppError, ErrorCode};
use shared::models::{GroupStatus, OrderStatus, SurplusStatus};
use std::fmt;
use thiserror::Error;

use crate::store::{StoreError, collections};

/// Entity named in a not-found or already-exists error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Group,
    Order,
    SurplusItem,
    Notification,
    Profile,
    PlatformStats,
    Document,
}

impl Entity {
    pub fn from_collection(collection: &str) -> Self {
        match collection {
            collections::GROUPS => Entity::Group,
            collections::ORDERS => Entity::Order,
            collections::SURPLUS => Entity::SurplusItem,
            collections::NOTIFICATIONS => Entity::Notification,
            collections::USERS => Entity::Profile,
            collections::PLATFORM_STATS => Entity::PlatformStats,
            _ => Entity::Document,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Entity::Group => "Buying group",
            Entity::Order => "Order",
            Entity::SurplusItem => "Surplus item",
            Entity::Notification => "Notification",
            Entity::Profile => "User profile",
            Entity::PlatformStats => "Platform stats",
            Entity::Document => "Document",
        }
    }

    fn not_found_code(&self) -> ErrorCode {
        match self {
            Entity::Group => ErrorCode::GroupNotFound,
            Entity::Order => ErrorCode::OrderNotFound,
            Entity::SurplusItem => ErrorCode::SurplusNotFound,
            Entity::Notification => ErrorCode::NotificationNotFound,
            Entity::Profile => ErrorCode::ProfileNotFound,
            Entity::PlatformStats | Entity::Document => ErrorCode::NotFound,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: Entity, id: String },

    #[error("User {user_id} is already a member of group {group_id}")]
    AlreadyMember { group_id: String, user_id: String },

    #[error("Group {group_id} is full ({max_members} members)")]
    GroupFull { group_id: String, max_members: u32 },

    #[error("Group {group_id} is {} and not accepting members", status.as_str())]
    GroupInactive { group_id: String, status: GroupStatus },

    #[error("Requested {requested} of surplus item {item_id} but only {remaining} remaining")]
    InsufficientQuantity {
        item_id: String,
        requested: f64,
        remaining: f64,
    },

    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Surplus item {item_id} is {}", status.as_str())]
    Unavailable { item_id: String, status: SurplusStatus },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(StoreError),
}

pub type MarketResult<T> = Result<T, MarketError>;

impl MarketError {
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            MarketError::NotFound { .. } => "not_found",
            MarketError::AlreadyExists { .. } => "already_exists",
            MarketError::AlreadyMember { .. } => "already_member",
            MarketError::GroupFull { .. } => "group_full",
            MarketError::GroupInactive { .. } => "group_inactive",
            MarketError::InsufficientQuantity { .. } => "insufficient_quantity",
            MarketError::InvalidTransition { .. } => "invalid_transition",
            MarketError::Unavailable { .. } => "unavailable",
            MarketError::PermissionDenied(_) => "permission_denied",
            MarketError::Validation(_) => "validation",
            MarketError::Persistence(_) => "persistence",
        }
    }

    /// Only backing-store failures are worth retrying unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            MarketError::Persistence(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            MarketError::NotFound { entity, .. } => entity.not_found_code(),
            MarketError::AlreadyExists { entity, .. } => match entity {
                Entity::Profile => ErrorCode::ProfileExists,
                _ => ErrorCode::AlreadyExists,
            },
            MarketError::AlreadyMember { .. } => ErrorCode::AlreadyMember,
            MarketError::GroupFull { .. } => ErrorCode::GroupFull,
            MarketError::GroupInactive { .. } => ErrorCode::GroupInactive,
            MarketError::InsufficientQuantity { .. } => ErrorCode::InsufficientQuantity,
            MarketError::InvalidTransition { from, .. } if from.is_terminal() => {
                ErrorCode::OrderTerminal
            }
            MarketError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            MarketError::Unavailable { .. } => ErrorCode::SurplusUnavailable,
            MarketError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            MarketError::Validation(_) => ErrorCode::ValidationFailed,
            MarketError::Persistence(e) => match e {
                StoreError::Timeout(_) => ErrorCode::TimeoutError,
                StoreError::Contended { .. } | StoreError::VersionConflict { .. } => {
                    ErrorCode::ConcurrentModification
                }
                StoreError::Serialization(_) | StoreError::InvalidDocument(_) => {
                    ErrorCode::InternalError
                }
                _ => ErrorCode::DatabaseError,
            },
        }
    }
}

impl From<StoreError> for MarketError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => MarketError::NotFound {
                entity: Entity::from_collection(&collection),
                id,
            },
            StoreError::AlreadyExists { collection, id } => MarketError::AlreadyExists {
                entity: Entity::from_collection(&collection),
                id,
            },
            other => MarketError::Persistence(other),
        }
    }
}

impl From<MarketError> for AppError {
    fn from(err: MarketError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let app = AppError::with_message(code, message).with_detail("kind", err.kind());
        match err {
            MarketError::NotFound { id, .. } | MarketError::AlreadyExists { id, .. } => {
                app.with_detail("id", id)
            }
            MarketError::AlreadyMember { group_id, user_id } => app
                .with_detail("group_id", group_id)
                .with_detail("user_id", user_id),
            MarketError::GroupFull {
                group_id,
                max_members,
            } => app
                .with_detail("group_id", group_id)
                .with_detail("max_members", max_members),
            MarketError::InsufficientQuantity {
                item_id,
                requested,
                remaining,
            } => app
                .with_detail("item_id", item_id)
                .with_detail("requested", requested)
                .with_detail("remaining", remaining),
            MarketError::InvalidTransition { order_id, from, to } => app
                .with_detail("order_id", order_id)
                .with_detail("from", from.as_str())
                .with_detail("to", to.as_str()),
            MarketError::Persistence(e) => app.with_detail("retryable", e.is_retryable()),
            _ => app,
        }
    }
}
