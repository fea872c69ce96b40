//! Profile provisioning and self-edit service.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::models::profile::Profile;
use crate::persistence::db::Database;
use crate::persistence::profile_repo::ProfileRepo;
use crate::policy::predicates;
use crate::policy::Actor;
use crate::{AppError, Result};

/// Identity metadata delivered by the auth collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaims {
    /// Stable identity reference from the auth provider.
    pub identity_id: String,
    /// Account email address.
    pub email: String,
    /// Optional display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Self-editable profile fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEdit {
    /// Replacement display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Replacement department.
    #[serde(default)]
    pub department: Option<String>,
}

/// Service for profile provisioning and reads.
#[derive(Clone)]
pub struct ProfileService {
    profiles: ProfileRepo,
}

impl ProfileService {
    /// Create a new service instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            profiles: ProfileRepo::new(db),
        }
    }

    /// Find or auto-provision the profile for an authenticated identity.
    ///
    /// First authentication creates an intern profile with zero points;
    /// later calls return the existing record unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConstraintViolation` for an empty identity
    /// reference or email, or `AppError::Upstream` on persistence failure.
    pub async fn ensure_profile(&self, claims: IdentityClaims) -> Result<Profile> {
        if claims.identity_id.trim().is_empty() {
            return Err(AppError::ConstraintViolation(
                "identity reference must not be empty".into(),
            ));
        }
        if claims.email.trim().is_empty() {
            return Err(AppError::ConstraintViolation(
                "email must not be empty".into(),
            ));
        }

        if let Some(existing) = self.profiles.get_by_identity(&claims.identity_id).await? {
            return Ok(existing);
        }

        let profile = Profile::new(claims.identity_id, claims.email, claims.display_name);
        let created = self.profiles.create(&profile).await?;
        info!(profile_id = %created.id, "profile auto-provisioned");
        Ok(created)
    }

    /// Fetch a single profile; readable by any authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the profile does not exist.
    pub async fn get(&self, actor: &Actor, id: &str) -> Result<Profile> {
        if !predicates::can_read_profile(actor) {
            return Err(AppError::Forbidden("profile read denied".into()));
        }
        self.profiles
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {id} not found")))
    }

    /// List all profiles.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Profile>> {
        if !predicates::can_read_profile(actor) {
            return Err(AppError::Forbidden("profile read denied".into()));
        }
        self.profiles.list().await
    }

    /// Edit the caller's own display name and department.
    ///
    /// Role and points are never reachable through this path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when editing another profile, or
    /// `AppError::NotFound` if the profile does not exist.
    pub async fn update_own(&self, actor: &Actor, id: &str, edit: ProfileEdit) -> Result<Profile> {
        if !predicates::can_edit_profile(actor, id) {
            return Err(AppError::Forbidden(
                "profiles may only be edited by their owner".into(),
            ));
        }

        let current = self
            .profiles
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {id} not found")))?;

        let display_name = edit.display_name.or(current.display_name);
        let department = edit.department.or(current.department);
        self.profiles
            .update_self_fields(id, display_name, department)
            .await
    }
}
