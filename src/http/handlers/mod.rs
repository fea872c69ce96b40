//! HTTP handler modules, one per resource.

pub mod chat;
pub mod profile;
pub mod session;
pub mod task;
pub mod upload;

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::auth;
use crate::policy::Actor;
use crate::{AppError, Result};

use super::AppState;

/// Resolve the acting profile from the `Authorization: Bearer` header.
///
/// # Errors
///
/// Returns `AppError::Unauthenticated` if the header is missing,
/// malformed, or names an unknown session.
pub async fn require_actor(state: &Arc<AppState>, headers: &HeaderMap) -> Result<Actor> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthenticated("missing bearer token".into()))?;
    auth::authenticate(&state.sessions, &state.profile_repo(), token).await
}
