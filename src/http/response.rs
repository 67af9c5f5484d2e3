//! Response and error sending.
//!
//! # Responsibilities
//! - Turn a handler's serialized return value into a JSON response
//! - Translate `ApiError` into a status + message body
//! - Log internal failures without leaking them to the client
//!
//! # Design Decisions
//! - `null` results produce an empty body with the success status
//! - Error bodies are `{"status": <code>, "message": "<text>"}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::http::error::{ApiError, HttpException};

/// Message sent for every error that is not an `HttpException`.
pub const SERVICE_UNAVAILABLE: &str = "Service unavailable";

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    status: u16,
    message: &'a str,
}

/// Send a successful result.
pub fn send(status: StatusCode, result: Value) -> Response {
    tracing::debug!(status = %status, "Sending result");
    if result.is_null() {
        return status.into_response();
    }
    (status, Json(result)).into_response()
}

/// Send an error, forwarding HTTP exceptions and masking everything else.
pub fn send_error(err: ApiError) -> Response {
    match err {
        ApiError::Http(exception) => {
            tracing::debug!(status = %exception.status, message = %exception.message, "Sending HTTP exception");
            exception_response(&exception)
        }
        ApiError::Internal(source) => {
            tracing::error!(error = %source, "Handler failed");
            exception_response(&HttpException::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                SERVICE_UNAVAILABLE,
            ))
        }
    }
}

fn exception_response(exception: &HttpException) -> Response {
    let body = ErrorBody {
        status: exception.status.as_u16(),
        message: &exception.message,
    };
    (exception.status, Json(body)).into_response()
}
