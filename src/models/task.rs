//! Task model and status lifecycle helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default points value assigned to a task when none is given.
pub const DEFAULT_TASK_POINTS: i64 = 10;

/// Lifecycle status for a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task created but not yet started.
    Pending,
    /// Task actively being worked.
    InProgress,
    /// Task finished; terminal.
    Completed,
    /// Task missed its due date; terminal, set by the system sweep only.
    Overdue,
}

/// Scheduling priority for a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Low urgency.
    Low,
    /// Default urgency.
    Medium,
    /// High urgency.
    High,
}

/// An assignable unit of work with status, priority, and a points value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Unique record identifier.
    pub id: String,
    /// Short summary; never empty.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Scheduling priority.
    pub priority: TaskPriority,
    /// Points credited to the assignee on completion; fixed at creation.
    pub points: i64,
    /// Optional due date; tasks past it are swept to overdue.
    pub due_date: Option<DateTime<Utc>>,
    /// Profile assigned to work the task.
    pub assignee_id: Option<String>,
    /// Profile that created the task.
    pub created_by: Option<String>,
    /// Set exactly when the task reaches `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskStatus {
    /// Determine whether a lifecycle transition is permitted.
    ///
    /// Movement through pending → `in_progress` → completed is forward-only;
    /// overdue is reachable from either non-terminal state and has no exits.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress | Self::Overdue)
                | (Self::InProgress, Self::Completed | Self::Overdue)
        )
    }
}

impl Task {
    /// Construct a new pending task with a generated identifier.
    #[must_use]
    pub fn new(
        title: String,
        description: Option<String>,
        priority: TaskPriority,
        points: i64,
        due_date: Option<DateTime<Utc>>,
        assignee_id: Option<String>,
        created_by: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            status: TaskStatus::Pending,
            priority,
            points,
            due_date,
            assignee_id,
            created_by,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the task is past its due date and still eligible for the sweep.
    #[must_use]
    pub fn is_due_for_overdue(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, TaskStatus::Pending | TaskStatus::InProgress)
            && self.due_date.is_some_and(|due| due < now)
    }
}
