//! Profile read and self-edit handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::models::profile::Profile;
use crate::services::profile_service::ProfileEdit;
use crate::Result;

use super::{require_actor, AppState};

/// `GET /profiles` — list all profiles.
///
/// # Errors
///
/// Returns `AppError::Unauthenticated` without a valid session.
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Profile>>> {
    let actor = require_actor(&state, &headers).await?;
    let profiles = state.profile_service().list(&actor).await?;
    Ok(Json(profiles))
}

/// `GET /profiles/{id}` — fetch one profile.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown profile.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Profile>> {
    let actor = require_actor(&state, &headers).await?;
    let profile = state.profile_service().get(&actor, &id).await?;
    Ok(Json(profile))
}

/// `PUT /profiles/{id}` — edit the caller's own display name/department.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when editing another profile.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(edit): Json<ProfileEdit>,
) -> Result<Json<Profile>> {
    let actor = require_actor(&state, &headers).await?;
    let profile = state.profile_service().update_own(&actor, &id, edit).await?;
    Ok(Json(profile))
}
