//! Notification API
//!
//! Every route works on the caller's own inbox.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/notifications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/unread-count", get(handler::unread_count))
        .route("/read-all", post(handler::mark_all_read))
        .route("/{id}/read", post(handler::mark_read))
        .route("/{id}/archive", post(handler::archive))
}
