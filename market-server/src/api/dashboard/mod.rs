//! Dashboard, recommendation and usage event API

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/dashboard", get(handler::dashboard))
        .route("/api/predictions", get(handler::predictions))
        .route(
            "/api/events",
            get(handler::list_events).post(handler::record_event),
        )
}
