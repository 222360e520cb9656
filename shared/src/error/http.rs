//! Error code to HTTP status

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Status a handler answers with for this code
    pub fn http_status(&self) -> StatusCode {
        use ErrorCode::*;

        match self {
            NotFound | GroupNotFound | OrderNotFound | SurplusNotFound | NotificationNotFound
            | ProfileNotFound => StatusCode::NOT_FOUND,

            // state conflicts the client can observe and react to
            AlreadyExists | AlreadyMember | GroupFull | GroupInactive | InvalidTransition
            | OrderTerminal | InsufficientQuantity | SurplusUnavailable | ProfileExists
            | ConcurrentModification => StatusCode::CONFLICT,

            TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            _ => match self.category() {
                ErrorCategory::Auth => StatusCode::UNAUTHORIZED,
                ErrorCategory::Permission => StatusCode::FORBIDDEN,
                ErrorCategory::System => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_by_code() {
        assert_eq!(ErrorCode::ValidationFailed.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::GroupNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::GroupFull.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::InsufficientQuantity.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::NotAuthenticated.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::PermissionDenied.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::TimeoutError.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ErrorCode::DatabaseError.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
