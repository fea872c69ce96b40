//! Bearer-token session store and actor resolution.
//!
//! Credential verification is the auth collaborator's job; this module
//! only maps issued tokens back to profiles. Tokens live in memory and
//! die with the process.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::persistence::profile_repo::ProfileRepo;
use crate::policy::Actor;
use crate::{AppError, Result};

/// In-memory map from bearer token to profile id.
#[derive(Default)]
pub struct Sessions {
    tokens: RwLock<HashMap<String, String>>,
}

impl Sessions {
    /// Issue a fresh token for a profile.
    pub async fn issue(&self, profile_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens
            .write()
            .await
            .insert(token.clone(), profile_id.to_owned());
        token
    }

    /// Resolve a token to its profile id, if the session exists.
    pub async fn resolve(&self, token: &str) -> Option<String> {
        self.tokens.read().await.get(token).cloned()
    }

    /// Drop a session; returns whether it existed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }
}

/// Resolve a bearer token to the acting profile.
///
/// # Errors
///
/// Returns `AppError::Unauthenticated` if the token is unknown or the
/// profile behind it no longer exists.
pub async fn authenticate(sessions: &Sessions, profiles: &ProfileRepo, token: &str) -> Result<Actor> {
    let profile_id = sessions
        .resolve(token)
        .await
        .ok_or_else(|| AppError::Unauthenticated("invalid session token".into()))?;
    let profile = profiles
        .get_by_id(&profile_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("session profile no longer exists".into()))?;
    Ok(Actor::new(profile.id, profile.role))
}
