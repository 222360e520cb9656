//! Numeric error codes
//!
//! The leading digit is the category (see [`ErrorCategory`](super::ErrorCategory)):
//! 0 general, 1 auth, 2 permission, 3 buying group, 4 order, 5 surplus,
//! 6 notification, 7 profile, 9 system. Codes are stable wire values;
//! never renumber one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares the enum, its message table and the `u16` conversion from one list
macro_rules! error_codes {
    ($( $(#[$meta:meta])* $name:ident = $value:literal => $message:literal, )+) => {
        /// Error code sent to clients as a bare `u16`
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $( $(#[$meta])* $name = $value, )+
        }

        impl ErrorCode {
            /// Default English message
            pub const fn message(&self) -> &'static str {
                match self {
                    $( ErrorCode::$name => $message, )+
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(ErrorCode::$name), )+
                    _ => Err(InvalidErrorCode(value)),
                }
            }
        }
    };
}

error_codes! {
    ValidationFailed = 2 => "Validation failed",
    NotFound = 3 => "Resource not found",
    AlreadyExists = 4 => "Resource already exists",

    NotAuthenticated = 1001 => "User is not authenticated",
    TokenExpired = 1003 => "Token has expired",
    TokenInvalid = 1004 => "Token is invalid",

    PermissionDenied = 2001 => "Permission denied",

    GroupNotFound = 3001 => "Buying group not found",
    AlreadyMember = 3002 => "User is already a member of this group",
    GroupFull = 3003 => "Group has reached its member limit",
    /// Archived or inactive
    GroupInactive = 3004 => "Group is not accepting members",

    OrderNotFound = 4001 => "Order not found",
    InvalidTransition = 4002 => "Status change is not allowed",
    OrderTerminal = 4003 => "Order is already closed",

    SurplusNotFound = 5001 => "Surplus item not found",
    InsufficientQuantity = 5002 => "Not enough quantity remaining",
    /// Withdrawn or expired
    SurplusUnavailable = 5003 => "Surplus item is no longer available",

    NotificationNotFound = 6001 => "Notification not found",

    ProfileNotFound = 7001 => "User profile not found",
    ProfileExists = 7002 => "User profile already exists",

    InternalError = 9001 => "Internal server error",
    DatabaseError = 9002 => "Database error",
    /// Store did not answer in time
    TimeoutError = 9004 => "Operation timed out, please retry",
    /// Compare-and-swap gave up on a hot document
    ConcurrentModification = 9005 => "Resource is busy, please retry",
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether a client may send the same request again
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::TimeoutError | ErrorCode::ConcurrentModification | ErrorCode::DatabaseError
        )
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A `u16` that names no [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error code {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::GroupFull.code(), 3003);
        assert_eq!(ErrorCode::InvalidTransition.code(), 4002);
        assert_eq!(ErrorCode::InsufficientQuantity.code(), 5002);
        assert_eq!(ErrorCode::NotificationNotFound.code(), 6001);
        assert_eq!(ErrorCode::ProfileExists.code(), 7002);
        assert_eq!(ErrorCode::TimeoutError.code(), 9004);
    }

    #[test]
    fn test_u16_conversion() {
        assert_eq!(ErrorCode::try_from(3002), Ok(ErrorCode::AlreadyMember));
        assert_eq!(ErrorCode::try_from(9005), Ok(ErrorCode::ConcurrentModification));
        assert_eq!(ErrorCode::try_from(1002), Err(InvalidErrorCode(1002)));
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(u16::from(ErrorCode::OrderNotFound), 4001);
    }

    #[test]
    fn test_wire_format_is_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::GroupFull).unwrap(), "3003");
        let code: ErrorCode = serde_json::from_str("5002").unwrap();
        assert_eq!(code, ErrorCode::InsufficientQuantity);
        assert!(serde_json::from_str::<ErrorCode>("8001").is_err());
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::TimeoutError.is_retryable());
        assert!(ErrorCode::ConcurrentModification.is_retryable());
        assert!(!ErrorCode::GroupFull.is_retryable());
    }

    #[test]
    fn test_message_and_display() {
        assert_eq!(ErrorCode::GroupFull.message(), "Group has reached its member limit");
        assert_eq!(ErrorCode::OrderNotFound.to_string(), "4001");
    }
}
