//! Profile repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::profile::{Profile, Role};
use crate::{AppError, Result};

use super::db::Database;

/// Repository wrapper around `SQLite` for profile records.
#[derive(Clone)]
pub struct ProfileRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    identity_id: String,
    email: String,
    display_name: Option<String>,
    role: String,
    department: Option<String>,
    points: i64,
    created_at: String,
    updated_at: String,
}

impl ProfileRow {
    /// Convert a database row into the domain model.
    fn into_profile(self) -> Result<Profile> {
        Ok(Profile {
            role: parse_role(&self.role)?,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
            id: self.id,
            identity_id: self.identity_id,
            email: self.email,
            display_name: self.display_name,
            department: self.department,
            points: self.points,
        })
    }
}

fn parse_role(s: &str) -> Result<Role> {
    match s {
        "intern" => Ok(Role::Intern),
        "employee" => Ok(Role::Employee),
        "admin" => Ok(Role::Admin),
        other => Err(AppError::Upstream(format!("invalid role: {other}"))),
    }
}

fn role_str(r: Role) -> &'static str {
    match r {
        Role::Intern => "intern",
        Role::Employee => "employee",
        Role::Admin => "admin",
    }
}

fn parse_timestamp(s: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Upstream(format!("invalid {column}: {e}")))
}

impl ProfileRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new profile record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the database insert fails.
    pub async fn create(&self, profile: &Profile) -> Result<Profile> {
        sqlx::query(
            "INSERT INTO profile (id, identity_id, email, display_name, role, department,
             points, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&profile.id)
        .bind(&profile.identity_id)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(role_str(profile.role))
        .bind(&profile.department)
        .bind(profile.points)
        .bind(profile.created_at.to_rfc3339())
        .bind(profile.updated_at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;

        Ok(profile.clone())
    }

    /// Retrieve a profile by record identifier.
    ///
    /// Returns `Ok(None)` if the profile does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Profile>> {
        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profile WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    /// Retrieve a profile by its auth-provider identity reference.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn get_by_identity(&self, identity_id: &str) -> Result<Option<Profile>> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT * FROM profile WHERE identity_id = ?1")
                .bind(identity_id)
                .fetch_optional(self.db.as_ref())
                .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    /// List all profiles ordered by email.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn list(&self) -> Result<Vec<Profile>> {
        let rows: Vec<ProfileRow> = sqlx::query_as("SELECT * FROM profile ORDER BY email")
            .fetch_all(self.db.as_ref())
            .await?;

        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    /// Update the self-editable fields of a profile.
    ///
    /// Role and points are deliberately not reachable through this path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the profile does not exist, or
    /// `AppError::Upstream` if the update fails.
    pub async fn update_self_fields(
        &self,
        id: &str,
        display_name: Option<String>,
        department: Option<String>,
    ) -> Result<Profile> {
        let result = sqlx::query(
            "UPDATE profile SET display_name = ?1, department = ?2, updated_at = ?3
             WHERE id = ?4",
        )
        .bind(&display_name)
        .bind(&department)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(self.db.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("profile {id} not found")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {id} not found")))
    }
}
