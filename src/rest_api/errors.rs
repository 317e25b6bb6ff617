//! # REST API Errors
//!
//! Error types for the REST API module.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::observability::{Event, Logger};
use crate::store::StoreError;

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Malformed selection input, identifier or query parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required parameter or body field
    #[error("Missing required parameter: {0}")]
    MissingParam(String),

    /// Request body is not a JSON object
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Page size above the maximum
    #[error("Count {0} exceeds maximum {1}")]
    LimitExceeded(usize, usize),

    /// Single-row lookup matched nothing
    #[error("Resource not found")]
    NotFound,

    /// A referenced entity does not exist
    #[error("{0} {1} not found")]
    EntityNotFound(&'static str, i64),

    /// Caller is authenticated but may not act on this resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness violated (duplicate user, registration, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    // ==================
    // Auth Errors
    // ==================
    #[error("{0}")]
    Auth(#[from] AuthError),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// The backing store failed
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RestError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            RestError::MissingParam(_) => StatusCode::BAD_REQUEST,
            RestError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RestError::LimitExceeded(_, _) => StatusCode::BAD_REQUEST,

            // 401/500 from auth
            RestError::Auth(auth_err) => {
                StatusCode::from_u16(auth_err.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
            }

            // 403 Forbidden
            RestError::Forbidden(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            RestError::NotFound => StatusCode::NOT_FOUND,
            RestError::EntityNotFound(_, _) => StatusCode::NOT_FOUND,

            // 409 Conflict
            RestError::Conflict(_) => StatusCode::CONFLICT,

            // 500 Internal Server Error
            RestError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for a malformed argument
    pub fn invalid(message: impl Into<String>) -> Self {
        RestError::InvalidArgument(message.into())
    }
}

impl From<StoreError> for RestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => RestError::Conflict(msg),
            StoreError::MissingReference(msg) => RestError::InvalidArgument(msg),
            other => RestError::Upstream(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<RestError> for ErrorResponse {
    fn from(err: RestError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        let code = status.as_u16().to_string();

        if status.is_server_error() {
            Logger::error(
                Event::RequestFailed.as_str(),
                &[("code", code.as_str()), ("error", message.as_str())],
            );
        } else if matches!(self, RestError::Auth(_)) {
            Logger::warn(
                Event::AuthRejected.as_str(),
                &[("code", code.as_str()), ("error", message.as_str())],
            );
        } else {
            Logger::trace(
                Event::RequestRejected.as_str(),
                &[("code", code.as_str()), ("error", message.as_str())],
            );
        }

        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RestError::invalid("count").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RestError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            RestError::EntityNotFound("event", 23).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RestError::Conflict("dup".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RestError::Upstream("down".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_propagation() {
        let rest_err = RestError::from(AuthError::InvalidCredentials);
        assert_eq!(rest_err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_store_error_classification() {
        assert!(matches!(
            RestError::from(StoreError::Duplicate("users.email".to_string())),
            RestError::Conflict(_)
        ));
        assert!(matches!(
            RestError::from(StoreError::MissingReference("fk".to_string())),
            RestError::InvalidArgument(_)
        ));
        assert!(matches!(
            RestError::from(StoreError::Unavailable("pool".to_string())),
            RestError::Upstream(_)
        ));
    }

    #[test]
    fn test_entity_not_found_message() {
        assert_eq!(
            RestError::EntityNotFound("event", 23).to_string(),
            "event 23 not found"
        );
    }
}
