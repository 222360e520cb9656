//! Authentication middleware
//!
//! [`require_auth`] guards every `/api/` route. A valid bearer token puts a
//! [`CurrentUser`] into the request extensions for handlers to pick up.
//!
//! | Failure | Response |
//! |---------|----------|
//! | no `Authorization` header | 401 NotAuthenticated |
//! | malformed header or bad token | 401 TokenInvalid |
//! | expired token | 401 TokenExpired |

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;

pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS preflight
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    // Outside the API (health, unknown paths)
    if !req.uri().path().starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let user = authenticate(state.jwt_service(), req.headers(), req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Validate the bearer token in `headers`
pub(crate) fn authenticate(
    jwt: &JwtService,
    headers: &http::HeaderMap,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = uri.path().to_string());
            return Err(AppError::not_authenticated());
        }
    };

    match jwt.validate_token(token) {
        Ok(claims) => Ok(CurrentUser::from(claims)),
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = uri.path().to_string()
            );
            Err(e.into())
        }
    }
}
