//! Market Server - street vendor and supplier marketplace backend
//!
//! # Overview
//!
//! - **Buying groups** (`groups`): vendors pool orders by location and category
//! - **Orders** (`orders`): status lifecycle with an append-only timeline
//! - **Surplus** (`surplus`): vendor-to-vendor resale with reservations
//! - **Notifications** (`notifications`, `messaging`): inbox plus outbound delivery
//! - **Profiles** (`profiles`): one profile per uid and the signup counters
//! - **Analytics** (`analytics`): per-role dashboards
//! - **Prediction** (`prediction`): purchase recommendations
//! - **HTTP API** (`api`): axum routes behind JWT auth
//!
//! # Layout
//!
//! ```text
//! market-server/src/
//! ├── core/          # config, state, server, errors
//! ├── auth/          # JWT, middleware, extractor
//! ├── api/           # HTTP routes and handlers
//! ├── store/         # document store (redb, memory, timeout decorator)
//! ├── utils/         # logging and validation
//! └── ...            # domain managers
//! ```

// Security logging macro, goes to the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub mod analytics;
pub mod api;
pub mod auth;
pub mod core;
pub mod error;
pub mod groups;
pub mod messaging;
pub mod money;
pub mod notifications;
pub mod orders;
pub mod prediction;
pub mod profiles;
pub mod store;
pub mod surplus;
pub mod utils;
pub mod watch;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use error::{MarketError, MarketResult};
pub use utils::logger::{init_logger, init_logger_with_file};
pub use utils::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
