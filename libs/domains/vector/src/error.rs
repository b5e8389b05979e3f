use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    /// The remote store did not answer within the transport's time budget.
    #[error("Milvus DB connection timeout: {0}")]
    Timeout(String),

    /// The remote store answered with a non-zero `code` in its JSON body.
    #[error("Milvus API error (code {code}): {message}")]
    Api { code: i64, message: String },

    /// The body was not JSON or lacked the fields the operation reads.
    #[error("Malformed Milvus response: {0}")]
    MalformedResponse(String),

    /// Connection-level failure other than a timeout.
    #[error("Milvus transport error: {0}")]
    Transport(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// An operation was attempted after `close()`.
    #[error("Milvus client has been closed")]
    ClientClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl VectorError {
    /// HTTP status a calling layer should answer with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            VectorError::Timeout(_) | VectorError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            VectorError::Api { .. } => StatusCode::NOT_FOUND,
            VectorError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            VectorError::Validation(_) => StatusCode::BAD_REQUEST,
            VectorError::ClientClosed | VectorError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, VectorError::Timeout(_))
    }
}

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VectorError::Timeout(err.to_string())
        } else if err.is_decode() {
            VectorError::MalformedResponse(err.to_string())
        } else if err.is_builder() {
            VectorError::Config(err.to_string())
        } else {
            VectorError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for VectorError {
    fn from(err: serde_json::Error) -> Self {
        VectorError::MalformedResponse(err.to_string())
    }
}

/// Convert VectorError to AppError for standardized HTTP error responses
impl From<VectorError> for AppError {
    fn from(err: VectorError) -> Self {
        let status = err.status_code();
        match err {
            // The remote message is passed through untouched
            VectorError::Api { message, .. } => AppError::NotFound(message),
            VectorError::Timeout(_) => AppError::Upstream {
                status,
                code: ErrorCode::UpstreamTimeout,
                message: "Milvus DB connection timeout".to_string(),
            },
            VectorError::Transport(msg) => AppError::Upstream {
                status,
                code: ErrorCode::UpstreamUnavailable,
                message: msg,
            },
            VectorError::MalformedResponse(msg) => AppError::Upstream {
                status,
                code: ErrorCode::UpstreamBadResponse,
                message: msg,
            },
            VectorError::Validation(msg) => AppError::BadRequest(msg),
            VectorError::ClientClosed => {
                AppError::InternalServerError("Milvus client has been closed".to_string())
            }
            VectorError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
        }
    }
}

impl IntoResponse for VectorError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_maps_to_not_found_with_remote_message() {
        let err = VectorError::Api {
            code: 1,
            message: "collection not found".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        match AppError::from(err) {
            AppError::NotFound(msg) => assert_eq!(msg, "collection not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_maps_to_service_unavailable() {
        let err = VectorError::Timeout("operation timed out".to_string());
        assert!(err.is_timeout());

        let app_error = AppError::from(err);
        assert_eq!(app_error.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(app_error.error_code(), ErrorCode::UpstreamTimeout);
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(
            VectorError::Transport("refused".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            VectorError::MalformedResponse("no result".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            VectorError::Validation("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            VectorError::ClientClosed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_uses_status_code() {
        let response = VectorError::MalformedResponse("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
