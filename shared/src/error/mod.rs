//! Error codes shared with clients
//!
//! - [`ErrorCode`]: stable numeric code, grouped by [`ErrorCategory`]
//! - [`AppError`]: code, message and optional details; an axum response
//! - [`ErrorBody`]: the JSON shape clients receive
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::GroupFull, "Group has 10 of 10 members")
//!     .with_detail("group_id", "g-1");
//! assert_eq!(ErrorBody::from(&err).code.code(), 3003);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
