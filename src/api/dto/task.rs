//! Background task DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::tasks::{TaskRecord, TaskStatus};

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SendEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(format = "email", example = "test@example.com")]
    pub to: String,
    #[schema(example = "Test Email")]
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ProcessDataRequest {
    #[schema(example = json!([1, 2, 3, 4, 5]))]
    pub data: Vec<i64>,
    /// One of `sum`, `avg`, `max`
    #[serde(default = "default_operation")]
    #[schema(example = "sum")]
    pub operation: String,
}

fn default_operation() -> String {
    "sum".to_string()
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct LogQuery {
    /// Message to log
    #[validate(length(min = 1, message = "Message must not be empty"))]
    pub message: String,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Acknowledgement that work was queued; it has not run yet.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskAcceptedResponse {
    pub message: String,
    pub status: TaskStatus,
    pub task_ids: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks_count: Option<usize>,
}

impl TaskAcceptedResponse {
    pub fn new(message: impl Into<String>, task_ids: Vec<Uuid>) -> Self {
        Self {
            message: message.into(),
            status: TaskStatus::Queued,
            task_ids,
            to: None,
            operation: None,
            data_size: None,
            tasks_count: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskStatusResponse {
    pub id: Uuid,
    #[schema(example = "process_data")]
    pub kind: String,
    pub status: TaskStatus,
    #[schema(value_type = String, format = DateTime)]
    pub submitted_at: jiff::Timestamp,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub started_at: Option<jiff::Timestamp>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub finished_at: Option<jiff::Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<TaskRecord> for TaskStatusResponse {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind.to_string(),
            status: record.status,
            submitted_at: record.submitted_at,
            started_at: record.started_at,
            finished_at: record.finished_at,
            result: record.result,
            error: record.error,
        }
    }
}
