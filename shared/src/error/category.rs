//! Error categories, derived from the leading digit of a code

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Group,
    Order,
    Surplus,
    Notification,
    Profile,
    /// 8xxx is unassigned and falls in here too
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Group,
            4 => Self::Order,
            5 => Self::Surplus,
            6 => Self::Notification,
            7 => Self::Profile,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        let cases = [
            (999, ErrorCategory::General),
            (1001, ErrorCategory::Auth),
            (2001, ErrorCategory::Permission),
            (3003, ErrorCategory::Group),
            (4002, ErrorCategory::Order),
            (5002, ErrorCategory::Surplus),
            (6001, ErrorCategory::Notification),
            (7001, ErrorCategory::Profile),
            (8500, ErrorCategory::System),
            (9001, ErrorCategory::System),
        ];
        for (code, category) in cases {
            assert_eq!(ErrorCategory::from_code(code), category, "code {code}");
        }
    }

    #[test]
    fn test_code_category_and_serde() {
        assert_eq!(ErrorCode::SurplusUnavailable.category(), ErrorCategory::Surplus);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
        assert_eq!(
            serde_json::to_string(&ErrorCategory::Surplus).unwrap(),
            "\"surplus\""
        );
    }
}
