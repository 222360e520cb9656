//! Shared types for the marketplace
//!
//! Data models, error codes, response structures and id utilities used by
//! market-server and its clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
