//! Error response DTOs.

use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::error::ValidationFieldError;

/// Standard error response format.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "code": "NOT_FOUND",
    "message": "Item with id 42 not found",
    "request_id": "5f0c6a9e-3c2b-4a53-9f0e-2b8f3d1c7a11"
}))]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
            request_id: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn not_found_error(entity: &str, field: &str, value: &str) -> Self {
        Self::new("NOT_FOUND", format!("{entity} with {field} {value} not found")).with_details(
            json!({ "entity": entity, "field": field, "value": value }),
        )
    }

    pub fn duplicate_error(entity: &str, field: &str, value: &str) -> Self {
        Self::new(
            "DUPLICATE_ENTRY",
            format!("{entity} with {field} '{value}' already exists"),
        )
        .with_details(json!({ "entity": entity, "field": field, "value": value }))
    }

    pub fn validation_error(field: &str, reason: &str) -> Self {
        Self::new("VALIDATION_ERROR", format!("Validation failed for {field}: {reason}"))
            .with_details(json!({ "field": field, "reason": reason }))
    }

    pub fn validation_errors(errors: &[ValidationFieldError]) -> Self {
        Self::new("VALIDATION_ERROR", "Request validation failed")
            .with_details(json!({ "errors": errors }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let body = serde_json::to_value(ErrorResponse::new("BAD_REQUEST", "nope")).unwrap();
        assert_eq!(body, json!({ "code": "BAD_REQUEST", "message": "nope" }));
    }

    #[test]
    fn test_not_found_message() {
        let error = ErrorResponse::not_found_error("Item", "id", "42").with_request_id("req-1");
        assert_eq!(error.message, "Item with id 42 not found");
        assert_eq!(error.request_id.as_deref(), Some("req-1"));
        assert_eq!(error.details.unwrap()["value"], "42");
    }

    #[test]
    fn test_validation_errors_are_listed() {
        let errors = vec![ValidationFieldError {
            field: "title".to_string(),
            message: "too long".to_string(),
        }];
        let error = ErrorResponse::validation_errors(&errors);
        assert_eq!(error.details.unwrap()["errors"][0]["field"], "title");
    }
}
