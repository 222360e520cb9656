//! Order API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/open", get(handler::open_for_quotes))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", post(handler::update_status))
}
