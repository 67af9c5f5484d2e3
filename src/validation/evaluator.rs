//! DTO schema evaluation.
//!
//! # Responsibilities
//! - Compile a DTO's JSON schema once, with whitelist enforcement
//! - Check a plain JSON value and aggregate every violation into one message
//! - Transform the value into the typed DTO
//!
//! # Design Decisions
//! - `additionalProperties: false` is forced at the top level of object schemas
//! - Unexpected-field violations use the configured localized template, one
//!   message per field
//! - Messages are joined with ", " and raised as a single 400

use std::borrow::Cow;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use serde_json::Value;
use thiserror::Error;

use crate::http::error::ApiError;
use crate::validation::Dto;

/// Default template for fields not declared on a DTO.
pub const DEFAULT_UNEXPECTED_FIELD_MESSAGE: &str = "'{field}' não é uma propriedade esperada";

/// Localized validation messages, carried in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessages {
    unexpected_field: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self::new(DEFAULT_UNEXPECTED_FIELD_MESSAGE)
    }
}

impl ValidationMessages {
    /// `template` must contain `{field}`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            unexpected_field: template.into(),
        }
    }

    pub fn unexpected_field(&self, field: &str) -> String {
        self.unexpected_field.replace("{field}", field)
    }
}

/// A DTO schema that failed to compile.
#[derive(Debug, Error)]
#[error("invalid schema for {dto}: {message}")]
pub struct SchemaError {
    pub dto: &'static str,
    pub message: String,
}

/// Compiled schema of one DTO type.
pub struct DtoSchema {
    dto: &'static str,
    validator: Validator,
}

impl std::fmt::Debug for DtoSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DtoSchema").field("dto", &self.dto).finish()
    }
}

impl DtoSchema {
    pub fn compile<T: Dto>() -> Result<Self, SchemaError> {
        let dto = std::any::type_name::<T>();
        let mut schema = T::schema();
        enforce_whitelist(&mut schema);

        let validator = jsonschema::validator_for(&schema).map_err(|e| SchemaError {
            dto,
            message: e.to_string(),
        })?;

        Ok(Self { dto, validator })
    }

    pub fn dto(&self) -> &'static str {
        self.dto
    }

    /// Validate `plain` and transform it into `T`.
    pub fn evaluate<T: Dto>(&self, plain: &Value, messages: &ValidationMessages) -> Result<T, ApiError> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(plain)
            .flat_map(|err| describe(&err, messages))
            .collect();

        if !violations.is_empty() {
            tracing::debug!(dto = self.dto, violations = violations.len(), "DTO validation failed");
            return Err(ApiError::bad_request(violations.join(", ")));
        }

        serde_json::from_value(plain.clone()).map_err(|e| ApiError::bad_request(e.to_string()))
    }
}

fn enforce_whitelist(schema: &mut Value) {
    if let Value::Object(map) = schema {
        let is_object = map.get("type").and_then(Value::as_str) == Some("object")
            || map.contains_key("properties");
        if is_object {
            map.insert("additionalProperties".to_string(), Value::Bool(false));
        }
    }
}

fn describe(err: &ValidationError<'_>, messages: &ValidationMessages) -> Vec<String> {
    match &err.kind {
        ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
            .iter()
            .map(|field| messages.unexpected_field(field))
            .collect(),
        _ => {
            let path = err.instance_path.to_string();
            let location: Cow<'_, str> = if path.is_empty() {
                Cow::Borrowed("")
            } else {
                Cow::Owned(format!("{}: ", path.trim_start_matches('/')))
            };
            vec![format!("{}{}", location, err)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Deserialize)]
    struct Login {
        user: String,
        #[allow(dead_code)]
        remember: Option<bool>,
    }

    impl Dto for Login {
        fn schema() -> Value {
            json!({
                "type": "object",
                "properties": {
                    "user": { "type": "string", "minLength": 1 },
                    "remember": { "type": "boolean" }
                },
                "required": ["user"],
                "additionalProperties": true
            })
        }
    }

    fn schema() -> DtoSchema {
        DtoSchema::compile::<Login>().unwrap()
    }

    #[test]
    fn test_valid_input_transforms() {
        let dto: Login = schema()
            .evaluate(&json!({"user": "ana"}), &ValidationMessages::default())
            .unwrap();
        assert_eq!(dto.user, "ana");
    }

    #[test]
    fn test_missing_required_field() {
        let err = schema()
            .evaluate::<Login>(&json!({}), &ValidationMessages::default())
            .unwrap_err();
        let http = err.as_http().unwrap();
        assert_eq!(http.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(http.message.contains("user"));
    }

    #[test]
    fn test_whitelist_forced_and_localized() {
        let err = schema()
            .evaluate::<Login>(&json!({"user": "ana", "admin": true}), &ValidationMessages::default())
            .unwrap_err();
        assert_eq!(
            err.as_http().unwrap().message,
            "'admin' não é uma propriedade esperada"
        );
    }

    #[test]
    fn test_violations_joined() {
        let err = schema()
            .evaluate::<Login>(
                &json!({"user": "", "remember": "yes", "x": 1, "y": 2}),
                &ValidationMessages::new("unexpected {field}"),
            )
            .unwrap_err();
        let message = err.as_http().unwrap().message.clone();
        let parts: Vec<_> = message.split(", ").collect();
        assert_eq!(parts.len(), 4, "message was: {message}");
        assert!(parts.contains(&"unexpected x"));
        assert!(parts.contains(&"unexpected y"));
        assert!(parts.iter().any(|p| p.starts_with("user: ")));
        assert!(parts.iter().any(|p| p.starts_with("remember: ")));
    }

    #[test]
    fn test_template_substitution() {
        let messages = ValidationMessages::new("field {field} is not allowed");
        assert_eq!(messages.unexpected_field("y"), "field y is not allowed");
    }
}
