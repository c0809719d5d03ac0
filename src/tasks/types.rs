use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Reduction applied by a data-processing task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataOperation {
    Sum,
    Avg,
    Max,
}

impl DataOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataOperation::Sum => "sum",
            DataOperation::Avg => "avg",
            DataOperation::Max => "max",
        }
    }

    /// Reduce `data`; an empty slice reduces to zero for every operation.
    pub fn apply(&self, data: &[i64]) -> Result<Value, String> {
        match self {
            DataOperation::Sum => data
                .iter()
                .try_fold(0i64, |acc, n| acc.checked_add(*n))
                .map(|sum| json!(sum))
                .ok_or_else(|| "sum overflows a 64-bit integer".to_string()),
            DataOperation::Avg => {
                if data.is_empty() {
                    return Ok(json!(0));
                }
                let total: f64 = data.iter().map(|n| *n as f64).sum();
                Ok(json!(total / data.len() as f64))
            }
            DataOperation::Max => Ok(json!(data.iter().copied().max().unwrap_or(0))),
        }
    }
}

impl FromStr for DataOperation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(DataOperation::Sum),
            "avg" => Ok(DataOperation::Avg),
            "max" => Ok(DataOperation::Max),
            other => Err(AppError::validation(
                "operation",
                format!("Unsupported operation '{other}', expected one of: sum, avg, max"),
            )),
        }
    }
}

impl fmt::Display for DataOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work a background task performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// Simulated email delivery
    SendEmail {
        to: String,
        subject: String,
        body: String,
    },
    ProcessData {
        data: Vec<i64>,
        operation: DataOperation,
    },
    WriteLog {
        message: String,
    },
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::SendEmail { .. } => "send_email",
            TaskKind::ProcessData { .. } => "process_data",
            TaskKind::WriteLog { .. } => "write_log",
        }
    }
}

/// Lifecycle of a submitted task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Queued => write!(f, "queued"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Succeeded => write!(f, "succeeded"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Snapshot of a task as tracked by the registry
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub id: Uuid,
    pub kind: &'static str,
    pub status: TaskStatus,
    pub submitted_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl TaskRecord {
    pub fn queued(id: Uuid, kind: &'static str) -> Self {
        Self {
            id,
            kind,
            status: TaskStatus::Queued,
            submitted_at: Timestamp::now(),
            started_at: None,
            finished_at: None,
            result: None,
            error: None,
        }
    }
}
