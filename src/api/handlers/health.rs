//! Health check endpoint handlers.
//!
//! The store check talks to the connection pool directly rather than going
//! through the item service, so it measures connectivity and nothing else.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Component report
/// - `GET /health/ready` - Readiness check
/// - `GET /health/live` - Liveness check
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
}

/// Report on the item store, the upload directory and the task queue.
///
/// An unhealthy store makes the whole service unhealthy; a missing upload
/// directory or a full queue only degrades it.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = BTreeMap::new();
    checks.insert("store".to_string(), check_store(&state).await);
    checks.insert("upload_dir".to_string(), check_upload_dir(&state).await);
    checks.insert("task_queue".to_string(), check_task_queue(&state));

    let response = HealthResponse::from_checks(crate::pkg_version(), checks);
    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response))
}

/// Readiness: ready once the item store answers.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match check_store(&state).await.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded | HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Liveness: answering at all is the signal.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_store(state: &AppState) -> ComponentHealth {
    let Some(pool) = &state.db_pool else {
        return ComponentHealth::healthy("in-memory store");
    };

    let start_time = Instant::now();
    let elapsed = || start_time.elapsed().as_millis() as u64;

    match pool.get().await {
        Ok(mut conn) => {
            use diesel_async::RunQueryDsl;

            match diesel::sql_query("SELECT 1").execute(&mut conn).await {
                Ok(_) => ComponentHealth::healthy("postgres: connected").timed(elapsed()),
                Err(e) => ComponentHealth::with_status(
                    HealthStatus::Unhealthy,
                    format!("Query failed: {e}"),
                )
                .timed(elapsed()),
            }
        }
        Err(e) => ComponentHealth::with_status(
            HealthStatus::Unhealthy,
            format!("Connection failed: {e}"),
        )
        .timed(elapsed()),
    }
}

async fn check_upload_dir(state: &AppState) -> ComponentHealth {
    let dir = state.services.files.upload_dir();
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => ComponentHealth::healthy(dir.display().to_string()),
        Ok(_) => ComponentHealth::with_status(
            HealthStatus::Degraded,
            format!("{} is not a directory", dir.display()),
        ),
        Err(e) => ComponentHealth::with_status(
            HealthStatus::Degraded,
            format!("{}: {e}", dir.display()),
        ),
    }
}

fn check_task_queue(state: &AppState) -> ComponentHealth {
    let queue = &state.services.tasks;
    let message = format!("{}/{} slots free", queue.available(), queue.capacity());
    if queue.available() == 0 {
        ComponentHealth::with_status(HealthStatus::Degraded, message)
    } else {
        ComponentHealth::healthy(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness_check() {
        assert_eq!(liveness_check().await, StatusCode::OK);
    }
}
