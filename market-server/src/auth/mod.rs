//! Identity boundary
//!
//! - [`JwtService`] validates tokens issued by the OTP service
//! - [`CurrentUser`] is the authenticated caller, with role capability checks
//! - [`require_auth`] guards `/api/*`

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
