//! Request DTO validation.
//!
//! # Data Flow
//! ```text
//! ApiRequest section (body / query / params) as plain JSON
//!     → evaluator.rs (JSON schema check, whitelist, aggregated message)
//!     → serde transform into the DTO type
//!     → stored as Validated<T> in the request
//!     → wrapped handler runs
//! ```
//!
//! Query and path parameters arrive as strings; DTO schemas for those
//! sections should declare string properties.

pub mod adapter;
pub mod evaluator;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use adapter::{body, params, query, validated};
pub use evaluator::{DtoSchema, SchemaError, ValidationMessages, DEFAULT_UNEXPECTED_FIELD_MESSAGE};

/// A request shape described by a JSON schema.
pub trait Dto: DeserializeOwned + Clone + Send + Sync + 'static {
    /// JSON schema of the accepted input. Top-level unknown properties are
    /// always rejected.
    fn schema() -> Value;
}
