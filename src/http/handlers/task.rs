//! Task handlers: CRUD plus status transitions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::task::{Task, TaskPriority, TaskStatus};
use crate::persistence::task_repo::TaskFieldUpdate;
use crate::services::task_service::NewTask;
use crate::Result;

use super::{require_actor, AppState};

/// Body for `PATCH /tasks/{id}`; absent fields keep their value.
#[derive(Debug, Deserialize)]
pub struct TaskPatch {
    /// Replacement title.
    #[serde(default)]
    pub title: Option<String>,
    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,
    /// Replacement priority.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    /// Replacement due date.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Replacement assignee.
    #[serde(default)]
    pub assignee_id: Option<String>,
}

/// Body for `POST /tasks/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    /// Requested target status.
    pub status: TaskStatus,
}

/// `POST /tasks` — create a task (staff only).
///
/// # Errors
///
/// Returns `AppError::Forbidden` for intern callers.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new_task): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>)> {
    let actor = require_actor(&state, &headers).await?;
    let task = state.task_service().create(&actor, new_task).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /tasks` — tasks visible to the caller.
///
/// # Errors
///
/// Returns `AppError::Unauthenticated` without a valid session.
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Task>>> {
    let actor = require_actor(&state, &headers).await?;
    let tasks = state.task_service().list_for(&actor).await?;
    Ok(Json(tasks))
}

/// `GET /tasks/{id}` — fetch one task.
///
/// # Errors
///
/// Returns `AppError::NotFound` or `AppError::Forbidden`.
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Task>> {
    let actor = require_actor(&state, &headers).await?;
    let task = state.task_service().get(&actor, &id).await?;
    Ok(Json(task))
}

/// `PATCH /tasks/{id}` — staff field update.
///
/// # Errors
///
/// Returns `AppError::Forbidden` for non-staff callers.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>> {
    let actor = require_actor(&state, &headers).await?;
    let update = TaskFieldUpdate {
        title: patch.title,
        description: patch.description.map(Some),
        priority: patch.priority,
        due_date: patch.due_date.map(Some),
        assignee_id: patch.assignee_id.map(Some),
    };
    let task = state.task_service().update_fields(&actor, &id, update).await?;
    Ok(Json(task))
}

/// `POST /tasks/{id}/status` — actor-initiated status transition.
///
/// # Errors
///
/// Returns `AppError::InvalidTransition` for illegal targets and
/// `AppError::Forbidden` for callers who are neither assignee nor staff.
pub async fn transition_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Task>> {
    let actor = require_actor(&state, &headers).await?;
    let task = state
        .task_service()
        .transition(&actor, &id, change.status)
        .await?;
    Ok(Json(task))
}

/// `DELETE /tasks/{id}` — admin only.
///
/// # Errors
///
/// Returns `AppError::Forbidden` for non-admin callers.
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let actor = require_actor(&state, &headers).await?;
    state.task_service().delete(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
