//! Type-safe error codes for API responses.
//!
//! Each code carries a client-facing identifier (e.g. "NOT_FOUND") and an
//! integer for logs and dashboards.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::UpstreamTimeout;
//! assert_eq!(code.as_str(), "UPSTREAM_TIMEOUT");
//! assert_eq!(code.code(), 2002);
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request parameters were rejected before reaching any backend
    InvalidRequest,

    /// Requested resource was not found
    NotFound,

    // Server errors
    /// An unexpected internal server error occurred
    InternalError,

    // Upstream errors (2000-2999)
    /// An upstream service answered with something we could not use
    UpstreamBadResponse,

    /// An upstream service did not answer in time
    UpstreamTimeout,

    /// An upstream service could not be reached
    UpstreamUnavailable,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::UpstreamBadResponse => "UPSTREAM_BAD_RESPONSE",
            Self::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
        }
    }

    /// Integer code for logging and monitoring.
    ///
    /// - 1000-1999: client and generic server errors
    /// - 2000-2999: upstream errors
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidRequest => 1001,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::UpstreamBadResponse => 2001,
            Self::UpstreamTimeout => 2002,
            Self::UpstreamUnavailable => 2003,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string_representation() {
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(ErrorCode::UpstreamTimeout.to_string(), "UPSTREAM_TIMEOUT");
    }

    #[test]
    fn test_error_code_integer_codes() {
        assert_eq!(ErrorCode::InvalidRequest.code(), 1001);
        assert_eq!(ErrorCode::UpstreamBadResponse.code(), 2001);
        assert_eq!(ErrorCode::UpstreamUnavailable.code(), 2003);
    }

    #[test]
    fn test_error_code_serde_roundtrip() {
        let json = serde_json::to_string(&ErrorCode::UpstreamUnavailable).unwrap();
        assert_eq!(json, "\"UPSTREAM_UNAVAILABLE\"");
        let code: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, ErrorCode::UpstreamUnavailable);
    }
}
