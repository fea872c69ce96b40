//! HTTP API surface.
//!
//! One axum router over the shared [`AppState`]; every handler resolves
//! the caller from a bearer token, delegates to a service, and maps
//! [`AppError`] kinds onto status codes. Only the error message text
//! crosses the trust boundary.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::auth::Sessions;
use crate::config::GlobalConfig;
use crate::persistence::db::Database;
use crate::persistence::profile_repo::ProfileRepo;
use crate::services::chat_service::ChatService;
use crate::services::profile_service::ProfileService;
use crate::services::task_service::TaskService;
use crate::services::upload_service::UploadService;
use crate::storage::BlobStore;
use crate::{AppError, Result};

/// Shared application state behind every handler.
pub struct AppState {
    /// Parsed global configuration.
    pub config: Arc<GlobalConfig>,
    /// Shared database pool.
    pub db: Arc<Database>,
    /// Bearer-token session store.
    pub sessions: Sessions,
    /// Attachment blob store.
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Profile repository over the shared pool.
    #[must_use]
    pub fn profile_repo(&self) -> ProfileRepo {
        ProfileRepo::new(Arc::clone(&self.db))
    }

    /// Profile service over the shared pool.
    #[must_use]
    pub fn profile_service(&self) -> ProfileService {
        ProfileService::new(Arc::clone(&self.db))
    }

    /// Task service over the shared pool.
    #[must_use]
    pub fn task_service(&self) -> TaskService {
        TaskService::new(Arc::clone(&self.db))
    }

    /// Chat service over the shared pool.
    #[must_use]
    pub fn chat_service(&self) -> ChatService {
        ChatService::new(Arc::clone(&self.db))
    }

    /// Upload service over the shared pool and blob store.
    #[must_use]
    pub fn upload_service(&self) -> UploadService {
        UploadService::new(Arc::clone(&self.db), Arc::clone(&self.blobs))
    }
}

/// Handler for `GET /health` — returns 200 OK with a plain-text body.
async fn health() -> &'static str {
    "ok"
}

/// Build the full API router over the shared state.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/session", post(handlers::session::create_session))
        .route("/profiles", get(handlers::profile::list_profiles))
        .route(
            "/profiles/{id}",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route(
            "/tasks",
            get(handlers::task::list_tasks).post(handlers::task::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::task::get_task)
                .patch(handlers::task::update_task)
                .delete(handlers::task::delete_task),
        )
        .route("/tasks/{id}/status", post(handlers::task::transition_task))
        .route(
            "/tasks/{id}/uploads",
            get(handlers::upload::list_task_uploads),
        )
        .route("/messages", post(handlers::chat::send_message))
        .route("/messages/{peer_id}", get(handlers::chat::conversation))
        .route("/uploads", post(handlers::upload::create_upload))
        .route("/uploads/{id}", get(handlers::upload::get_upload))
        .route(
            "/uploads/{id}/content",
            get(handlers::upload::download_upload),
        )
        .with_state(state)
}

/// Bind and serve the API until the token is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the listener cannot bind or the server
/// fails while running.
pub async fn serve(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let port = state.config.http_port;
    let bind = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Io(format!("failed to bind {bind}: {err}")))?;
    info!(%bind, "http api listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Io(format!("http server failed: {err}")))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::ConstraintViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
