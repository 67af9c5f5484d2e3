//! Error types surfaced by handlers and middleware.
//!
//! # Kinds
//! - `HttpException`: carries its own status and message, forwarded verbatim
//! - `ApiError::Internal`: anything else, logged and hidden behind a generic 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// An error that already knows how it should look on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct HttpException {
    pub status: StatusCode,
    pub message: String,
}

impl HttpException {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

/// Errors returned by controller handlers and middleware.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Recognised HTTP exception, sent to the client as-is.
    #[error(transparent)]
    Http(#[from] HttpException),

    /// Any other failure. Never exposed to the client.
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http(HttpException::new(status, message))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Http(HttpException::bad_request(message))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Http(HttpException::unauthorized(message))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Http(HttpException::forbidden(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Http(HttpException::not_found(message))
    }

    /// Wrap an arbitrary failure as an internal error.
    pub fn internal(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Internal(err.into())
    }

    /// The HTTP exception, if this is one.
    pub fn as_http(&self) -> Option<&HttpException> {
        match self {
            ApiError::Http(e) => Some(e),
            ApiError::Internal(_) => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(Box::new(err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(Box::new(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        crate::http::response::send_error(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_exception_converts() {
        let err: ApiError = HttpException::forbidden("nope").into();
        let http = err.as_http().unwrap();
        assert_eq!(http.status, StatusCode::FORBIDDEN);
        assert_eq!(http.message, "nope");
    }

    #[test]
    fn test_internal_has_no_http_view() {
        let err = ApiError::internal("database exploded");
        assert!(err.as_http().is_none());
        assert!(err.to_string().contains("database exploded"));
    }
}
