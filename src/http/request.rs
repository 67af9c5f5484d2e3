//! Request handling for controller methods.
//!
//! # Responsibilities
//! - Buffer and parse the request body (JSON when the content type says so)
//! - Collect path parameters and query parameters into maps
//! - Expose request extensions filled in by middleware
//!
//! # Design Decisions
//! - Empty bodies parse to `null`
//! - Non-JSON bodies are kept as a UTF-8 (lossy) string
//! - Query values are single-valued; the last occurrence wins

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{FromRequestParts, Query, RawPathParams},
    http::{header, request::Parts, Extensions, HeaderMap, Method, Request, Uri},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::http::error::ApiError;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A portion of the request that can be validated against a DTO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSection {
    Body,
    Query,
    Params,
}

impl std::fmt::Display for RequestSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestSection::Body => write!(f, "body"),
            RequestSection::Query => write!(f, "query"),
            RequestSection::Params => write!(f, "params"),
        }
    }
}

/// A DTO that passed validation, stored in the request extensions.
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

/// Request handed to controller methods.
#[derive(Debug)]
pub struct ApiRequest {
    parts: Parts,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    body: Value,
}

impl ApiRequest {
    /// Build from a raw axum request, reading at most `body_limit` bytes.
    pub async fn from_http(request: Request<Body>, body_limit: usize) -> Result<Self, ApiError> {
        let (mut parts, body) = request.into_parts();

        let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(raw) => raw
                .iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
            Err(_) => HashMap::new(),
        };

        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .map_err(|_| ApiError::bad_request("Malformed query string"))?;

        let bytes = axum::body::to_bytes(body, body_limit)
            .await
            .map_err(|_| ApiError::bad_request("Unable to read request body"))?;
        let body = parse_body(&parts.headers, &bytes)?;

        Ok(Self {
            parts,
            params,
            query,
            body,
        })
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    /// Correlation id assigned by the request-id layer, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Deserialize the body without schema validation.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
    }

    /// The DTO produced by a validation wrapper for this request.
    pub fn validated<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.parts
            .extensions
            .get::<Validated<T>>()
            .map(|Validated(dto)| dto)
    }

    /// The section as a plain JSON value, ready for schema validation.
    pub fn section(&self, section: RequestSection) -> Value {
        match section {
            RequestSection::Body => self.body.clone(),
            RequestSection::Query => string_map(&self.query),
            RequestSection::Params => string_map(&self.params),
        }
    }
}

fn string_map(map: &HashMap<String, String>) -> Value {
    let object: Map<String, Value> = map
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(object)
}

fn parse_body(headers: &HeaderMap, bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_slice(bytes).map_err(|_| ApiError::bad_request("Malformed JSON body"))
    } else {
        Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
    }
}
