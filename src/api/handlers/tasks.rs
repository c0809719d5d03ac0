//! Background task submission and status handlers.
//!
//! Submissions only enqueue work and answer `202 Accepted`; the task runs on
//! the worker pool afterwards and its progress is read back by id.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::TASK_TAG;
use crate::api::dto::{
    ErrorResponse, LogQuery, ProcessDataRequest, SendEmailRequest, TaskAcceptedResponse,
    TaskStatusResponse,
};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::tasks::{DataOperation, TaskKind};
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

type Accepted = (StatusCode, Json<TaskAcceptedResponse>);

/// Creates task routes.
///
/// Routes:
/// - POST /send-email     - Queue a simulated email
/// - POST /process-data   - Queue a reduction over a list of numbers
/// - POST /log            - Queue a log write
/// - POST /multiple-tasks - Queue a fixed batch of four tasks
/// - GET /{id}            - Task status
pub fn task_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(send_email))
        .routes(routes!(process_data))
        .routes(routes!(write_log))
        .routes(routes!(multiple_tasks))
        .routes(routes!(task_status))
}

fn accepted(response: TaskAcceptedResponse) -> Accepted {
    (StatusCode::ACCEPTED, Json(response))
}

/// POST /api/tasks/send-email
#[utoipa::path(
    post,
    path = "/send-email",
    tag = TASK_TAG,
    request_body = SendEmailRequest,
    responses(
        (status = 202, description = "Email task queued", body = TaskAcceptedResponse),
        (status = 400, description = "Invalid address", body = ErrorResponse),
        (status = 503, description = "Task queue is full", body = ErrorResponse)
    )
)]
async fn send_email(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SendEmailRequest>,
) -> AppResult<Accepted> {
    let to = req.to.clone();
    let id = state.services.tasks.submit(TaskKind::SendEmail {
        to: req.to,
        subject: req.subject,
        body: req.body,
    })?;

    let mut response = TaskAcceptedResponse::new("Email task queued successfully", vec![id]);
    response.to = Some(to);
    Ok(accepted(response))
}

/// POST /api/tasks/process-data
///
/// The operation is checked here, so an unknown one never reaches a worker.
#[utoipa::path(
    post,
    path = "/process-data",
    tag = TASK_TAG,
    request_body = ProcessDataRequest,
    responses(
        (status = 202, description = "Processing task queued", body = TaskAcceptedResponse),
        (status = 400, description = "Unsupported operation", body = ErrorResponse),
        (status = 503, description = "Task queue is full", body = ErrorResponse)
    )
)]
async fn process_data(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ProcessDataRequest>,
) -> AppResult<Accepted> {
    let operation: DataOperation = req.operation.parse()?;
    let data_size = req.data.len();
    let id = state.services.tasks.submit(TaskKind::ProcessData {
        data: req.data,
        operation,
    })?;

    let mut response =
        TaskAcceptedResponse::new("Data processing task queued successfully", vec![id]);
    response.operation = Some(operation.to_string());
    response.data_size = Some(data_size);
    Ok(accepted(response))
}

/// POST /api/tasks/log?message=...
#[utoipa::path(
    post,
    path = "/log",
    tag = TASK_TAG,
    params(LogQuery),
    responses(
        (status = 202, description = "Log task queued", body = TaskAcceptedResponse),
        (status = 503, description = "Task queue is full", body = ErrorResponse)
    )
)]
async fn write_log(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<LogQuery>,
) -> AppResult<Accepted> {
    let id = state.services.tasks.submit(TaskKind::WriteLog {
        message: query.message,
    })?;
    Ok(accepted(TaskAcceptedResponse::new(
        "Log task queued successfully",
        vec![id],
    )))
}

/// POST /api/tasks/multiple-tasks
///
/// Queues two log writes, an email and a sum in one go; if the queue cannot
/// take all four, none is queued.
#[utoipa::path(
    post,
    path = "/multiple-tasks",
    tag = TASK_TAG,
    responses(
        (status = 202, description = "Batch queued", body = TaskAcceptedResponse),
        (status = 503, description = "Task queue cannot take the whole batch", body = ErrorResponse)
    )
)]
async fn multiple_tasks(State(state): State<AppState>) -> AppResult<Accepted> {
    let batch = vec![
        TaskKind::WriteLog {
            message: "Task 1: Started".to_string(),
        },
        TaskKind::WriteLog {
            message: "Task 2: Started".to_string(),
        },
        TaskKind::SendEmail {
            to: "admin@example.com".to_string(),
            subject: "Multiple Tasks Test".to_string(),
            body: "This is a test of multiple background tasks".to_string(),
        },
        TaskKind::ProcessData {
            data: vec![1, 2, 3, 4, 5],
            operation: DataOperation::Sum,
        },
    ];

    let ids = state.services.tasks.submit_all(batch)?;
    let mut response = TaskAcceptedResponse::new("Multiple tasks queued successfully", ids);
    response.tasks_count = Some(response.task_ids.len());
    Ok(accepted(response))
}

/// GET /api/tasks/{id}
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TASK_TAG,
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task status", body = TaskStatusResponse),
        (status = 404, description = "Unknown task", body = ErrorResponse)
    )
)]
async fn task_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TaskStatusResponse>> {
    let record = state
        .services
        .tasks
        .status(&id)
        .ok_or_else(|| AppError::not_found("Task", id))?;
    Ok(Json(TaskStatusResponse::from(record)))
}
