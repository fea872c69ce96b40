//! Profile model and role definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization role carried by every profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Intern: sees and works only their own tasks.
    Intern,
    /// Employee: may create and manage tasks.
    Employee,
    /// Admin: employee rights plus task deletion.
    Admin,
}

impl Role {
    /// Whether the role carries staff-level task management rights.
    #[must_use]
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Employee | Self::Admin)
    }
}

/// A user account record carrying role and points balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Unique record identifier.
    pub id: String,
    /// Identity reference from the auth provider; immutable and unique.
    pub identity_id: String,
    /// Account email address.
    pub email: String,
    /// Optional display name, self-editable.
    pub display_name: Option<String>,
    /// Authorization role; immutable through the self-edit path.
    pub role: Role,
    /// Optional department, self-editable.
    pub department: Option<String>,
    /// Points balance; never negative.
    pub points: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Construct a freshly provisioned profile with intern role and zero points.
    #[must_use]
    pub fn new(identity_id: String, email: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            identity_id,
            email,
            display_name,
            role: Role::Intern,
            department: None,
            points: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
