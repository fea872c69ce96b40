//! Session issuance handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::models::profile::Profile;
use crate::services::profile_service::IdentityClaims;
use crate::Result;

use super::AppState;

/// Response body for a freshly issued session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The (possibly just provisioned) profile behind the session.
    pub profile: Profile,
}

/// `POST /auth/session` — provision the profile and issue a token.
///
/// # Errors
///
/// Returns `AppError::ConstraintViolation` for empty identity metadata.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(claims): Json<IdentityClaims>,
) -> Result<Json<SessionResponse>> {
    let profile = state.profile_service().ensure_profile(claims).await?;
    let token = state.sessions.issue(&profile.id).await;
    Ok(Json(SessionResponse { token, profile }))
}
