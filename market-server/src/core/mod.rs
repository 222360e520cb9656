//! Server bootstrap
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - managers and services shared by every handler
//! - [`Server`] - HTTP listener with graceful shutdown
//! - [`ServerError`] - startup failures

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::{Server, build_app};
pub use state::ServerState;
