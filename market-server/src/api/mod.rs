//! HTTP API
//!
//! | Module | Prefix |
//! |--------|--------|
//! | [`health`] | `/health` (public) |
//! | [`groups`] | `/api/groups` |
//! | [`orders`] | `/api/orders` |
//! | [`surplus`] | `/api/surplus` |
//! | [`notifications`] | `/api/notifications` |
//! | [`profiles`] | `/api/profile`, `/api/users`, `/api/stats` |
//! | [`dashboard`] | `/api/dashboard`, `/api/predictions` |
//!
//! Every `/api` route runs behind [`require_auth`](crate::auth::require_auth).

pub mod dashboard;
pub mod groups;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod profiles;
pub mod surplus;

use serde::{Deserialize, Serialize};

pub use shared::error::{AppError, AppResult};

/// Body returned by create endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}
