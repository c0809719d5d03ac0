//! Contact form DTOs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static pattern")
});

fn email_format(email: &str) -> Result<(), ValidationError> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Invalid email format".into()))
    }
}

/// Contact form fields, posted as `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(min_length = 1, max_length = 100, example = "Ada")]
    pub name: String,
    #[validate(
        length(max = 255, message = "Email must be at most 255 characters"),
        custom(function = "email_format")
    )]
    #[schema(max_length = 255, example = "ada@example.com")]
    pub email: String,
    #[validate(length(min = 1, max = 1000, message = "Message must be between 1 and 1000 characters"))]
    #[schema(min_length = 1, max_length = 1000)]
    pub message: String,
}

/// Accepted contact submission; the email is stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl From<ContactForm> for ContactSubmission {
    fn from(form: ContactForm) -> Self {
        Self {
            name: form.name,
            email: form.email.to_lowercase(),
            message: form.message,
        }
    }
}

/// Outcome of a contact submission: either the accepted data or one error
/// message per invalid field.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted: Option<ContactSubmission>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

impl ContactResponse {
    pub fn accepted(submission: ContactSubmission) -> Self {
        Self {
            success: true,
            submitted: Some(submission),
            errors: BTreeMap::new(),
        }
    }

    /// First message of each failing field
    pub fn rejected(errors: &ValidationErrors) -> Self {
        let errors = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, field_errors)| {
                let first = field_errors.first()?;
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                Some((field.to_string(), message))
            })
            .collect();

        Self {
            success: false,
            submitted: None,
            errors,
        }
    }
}
