//! File attachment handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::models::upload::FileUpload;
use crate::services::upload_service::NewUpload;
use crate::Result;

use super::{require_actor, AppState};

/// Query parameters for `POST /uploads`; the body carries the raw bytes.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Filename as known to the uploader.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Optional task to attach the file to.
    #[serde(default)]
    pub task_id: Option<String>,
}

/// `POST /uploads` — run the upload saga.
///
/// # Errors
///
/// Returns `AppError::ConstraintViolation` for oversized or disallowed
/// files, before any blob byte is written.
pub async fn create_upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<FileUpload>)> {
    let actor = require_actor(&state, &headers).await?;
    let upload = state
        .upload_service()
        .create(
            &actor,
            NewUpload {
                original_name: params.original_name,
                mime_type: params.mime_type,
                task_id: params.task_id,
                bytes: body,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(upload)))
}

/// `GET /uploads/{id}` — upload metadata.
///
/// # Errors
///
/// Returns `AppError::Forbidden` unless the caller is the uploader or
/// the assignee of the associated task.
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<FileUpload>> {
    let actor = require_actor(&state, &headers).await?;
    let upload = state.upload_service().get(&actor, &id).await?;
    Ok(Json(upload))
}

/// `GET /uploads/{id}/content` — the stored bytes with their MIME type.
///
/// # Errors
///
/// Same read predicate as the metadata endpoint.
pub async fn download_upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let actor = require_actor(&state, &headers).await?;
    let (upload, bytes) = state.upload_service().content(&actor, &id).await?;
    Ok(([(CONTENT_TYPE, upload.mime_type)], bytes))
}

/// `GET /tasks/{id}/uploads` — attachments of a task the caller can read.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if the task read predicate denies the
/// caller.
pub async fn list_task_uploads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<FileUpload>>> {
    let actor = require_actor(&state, &headers).await?;
    let uploads = state.upload_service().list_for_task(&actor, &id).await?;
    Ok(Json(uploads))
}
