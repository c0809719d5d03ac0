//! File upload, listing, download and deletion handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::FILE_TAG;
use crate::api::dto::{ErrorResponse, FileListResponse, FileUploadResponse};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field carrying the upload
const FILE_FIELD: &str = "file";

/// Creates file routes.
///
/// Routes:
/// - POST /upload           - Upload a file (multipart field `file`)
/// - GET /                  - List stored files
/// - GET /download/{name}   - Download a file
/// - DELETE /{name}         - Delete a file
pub fn file_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(upload_file))
        .routes(routes!(list_files))
        .routes(routes!(download_file))
        .routes(routes!(delete_file))
}

fn file_not_found(name: &str) -> AppError {
    AppError::NotFound {
        entity: "File".to_string(),
        field: "name".to_string(),
        value: name.to_string(),
    }
}

/// The request body limit surfaces as a multipart error mid-stream
fn multipart_error(error: MultipartError, limit: u64) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::bad_request(error.body_text())
    }
}

/// POST /api/files/upload - Upload a file
///
/// The body is read chunk by chunk and rejected as soon as it passes the
/// configured size limit.
#[utoipa::path(
    post,
    path = "/upload",
    tag = FILE_TAG,
    request_body(content_type = "multipart/form-data", description = "Multipart form with a `file` field"),
    responses(
        (status = 201, description = "File stored", body = FileUploadResponse),
        (status = 400, description = "No file or filename provided", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<FileUploadResponse>)> {
    let files = &state.services.files;
    let limit = files.max_upload_size();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
            files.check_size((bytes.len() + chunk.len()) as u64)?;
            bytes.extend_from_slice(&chunk);
        }

        let stored = files.save(&filename, content_type, &bytes).await?;
        return Ok((StatusCode::CREATED, Json(FileUploadResponse::from(stored))));
    }

    Err(AppError::bad_request("No file provided"))
}

/// GET /api/files - List stored files
#[utoipa::path(
    get,
    path = "/",
    tag = FILE_TAG,
    responses(
        (status = 200, description = "Stored files sorted by name", body = FileListResponse)
    )
)]
async fn list_files(State(state): State<AppState>) -> AppResult<Json<FileListResponse>> {
    let entries = state.services.files.list().await?;
    Ok(Json(FileListResponse::from(entries)))
}

/// GET /api/files/download/{name} - Download a file as an attachment
#[utoipa::path(
    get,
    path = "/download/{name}",
    tag = FILE_TAG,
    params(
        ("name" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let bytes = state
        .services
        .files
        .read(&name)
        .await?
        .ok_or_else(|| file_not_found(&name))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, attachment_disposition(&name)),
        ],
        bytes,
    ))
}

/// `attachment; filename="..."`, or a bare `attachment` when the name
/// cannot be carried in a header.
fn attachment_disposition(name: &str) -> HeaderValue {
    let quoted = format!("attachment; filename=\"{}\"", name.replace(['"', '\\'], ""));
    HeaderValue::from_str(&quoted).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// DELETE /api/files/{name} - Delete a file
#[utoipa::path(
    delete,
    path = "/{name}",
    tag = FILE_TAG,
    params(
        ("name" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    if state.services.files.delete(&name).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(file_not_found(&name))
    }
}
