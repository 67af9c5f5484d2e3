//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use routekit::{ApiError, Middleware};

/// Header the `tag` middleware appends stage names to.
pub const TRACE_HEADER: &str = "x-trace";

/// Send one request through `app` and return status plus decoded body.
///
/// Empty bodies decode to `Value::Null`, non-JSON bodies to a string.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, decode(&bytes))
}

/// Send a prepared request through `app`.
pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, decode(&bytes))
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

fn decode(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Append `name` to the trace header of the request.
pub fn append_trace(req: &mut Request<Body>, name: &str) {
    let trace = match req.headers().get(TRACE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(existing) if !existing.is_empty() => format!("{existing},{name}"),
        _ => name.to_string(),
    };
    req.headers_mut()
        .insert(TRACE_HEADER, HeaderValue::from_str(&trace).unwrap());
}

/// Middleware that records its name in the trace header and advances.
pub fn tag(name: &'static str) -> Middleware {
    Middleware::from_fn(name, move |mut req: Request<Body>| async move {
        append_trace(&mut req, name);
        Ok::<_, ApiError>(req)
    })
}

/// Middleware that stops the request with 403.
pub fn deny(name: &'static str) -> Middleware {
    Middleware::from_fn(name, move |_req: Request<Body>| async move {
        Err::<Request<Body>, _>(ApiError::forbidden(format!("stopped by {name}")))
    })
}

/// Stage names recorded so far, in execution order.
pub fn trace_of(headers: &axum::http::HeaderMap) -> Vec<String> {
    headers
        .get(TRACE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').map(str::to_owned).collect())
        .unwrap_or_default()
}
