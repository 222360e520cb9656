//! Profile API
//!
//! | Path | Method | Purpose |
//! |------|--------|---------|
//! | /api/profile | GET / POST / PUT | the caller's own profile |
//! | /api/users | GET | active users by role (admin) |
//! | /api/suppliers | GET | supplier directory (any signed-in user) |
//! | /api/users/{uid}/verify | POST | mark a user verified (admin) |
//! | /api/stats | GET | platform counters (admin) |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/profile",
            get(handler::get_own)
                .post(handler::create)
                .put(handler::update),
        )
        .route("/api/users", get(handler::list_by_role))
        .route("/api/suppliers", get(handler::list_suppliers))
        .route("/api/users/{uid}/verify", post(handler::verify))
        .route("/api/stats", get(handler::platform_stats))
}
