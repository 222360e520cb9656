//! Utilities
//!
//! - [`logger`] - tracing subscriber setup
//! - [`validation`] - text, phone and email checks shared by the managers

pub mod logger;
pub mod validation;

pub use shared::error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
