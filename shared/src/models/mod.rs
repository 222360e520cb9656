//! Data models
//!
//! Shared between market-server and its clients (via API).
//! All IDs are `String`; timestamps are Unix milliseconds.

pub mod analytics;
pub mod group;
pub mod notification;
pub mod order;
pub mod page;
pub mod role;
pub mod surplus;
pub mod user;

// Re-exports
pub use analytics::*;
pub use group::*;
pub use notification::*;
pub use order::*;
pub use page::*;
pub use role::*;
pub use surplus::*;
pub use user::*;
