//! Task lifecycle service: creation, field updates, status transitions,
//! deletion, and the overdue sweep.
//!
//! Every entry point re-checks the authorization predicates before
//! touching storage; status transitions validate against the state
//! machine and hand the repo a pre-computed balance delta so the points
//! effect commits atomically with the status write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::models::task::{Task, TaskPriority, TaskStatus, DEFAULT_TASK_POINTS};
use crate::persistence::db::Database;
use crate::persistence::profile_repo::ProfileRepo;
use crate::persistence::task_repo::{status_str, BalanceDelta, TaskFieldUpdate, TaskRepo};
use crate::policy::predicates;
use crate::policy::Actor;
use crate::services::points;
use crate::{AppError, Result};

/// Parameters for creating a task.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    /// Required task title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Priority; defaults to medium.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    /// Points value; defaults to 10, must be positive.
    #[serde(default)]
    pub points: Option<i64>,
    /// Optional due date.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Optional assignee profile id.
    #[serde(default)]
    pub assignee_id: Option<String>,
}

/// Service coordinating task mutations with their points effects.
#[derive(Clone)]
pub struct TaskService {
    tasks: TaskRepo,
    profiles: ProfileRepo,
}

impl TaskService {
    /// Create a new service instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            tasks: TaskRepo::new(Arc::clone(&db)),
            profiles: ProfileRepo::new(db),
        }
    }

    /// Create a task; staff only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for non-staff callers,
    /// `AppError::ConstraintViolation` for an empty title or non-positive
    /// points value, and `AppError::NotFound` for an unknown assignee.
    pub async fn create(&self, actor: &Actor, new_task: NewTask) -> Result<Task> {
        if !predicates::can_create_task(actor) {
            return Err(AppError::Forbidden(
                "only employees and admins may create tasks".into(),
            ));
        }

        let title = new_task.title.trim().to_owned();
        if title.is_empty() {
            return Err(AppError::ConstraintViolation(
                "task title must not be empty".into(),
            ));
        }

        let task_points = new_task.points.unwrap_or(DEFAULT_TASK_POINTS);
        if task_points <= 0 {
            return Err(AppError::ConstraintViolation(
                "task points value must be positive".into(),
            ));
        }

        if let Some(ref assignee_id) = new_task.assignee_id {
            self.require_profile(assignee_id).await?;
        }

        let task = Task::new(
            title,
            new_task.description,
            new_task.priority.unwrap_or(TaskPriority::Medium),
            task_points,
            new_task.due_date,
            new_task.assignee_id,
            Some(actor.profile_id.clone()),
        );
        let created = self.tasks.create(&task).await?;
        info!(task_id = %created.id, created_by = %actor.profile_id, "task created");
        Ok(created)
    }

    /// Fetch a single task the actor is allowed to read.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the task does not exist, or
    /// `AppError::Forbidden` if the read predicate denies the actor.
    pub async fn get(&self, actor: &Actor, id: &str) -> Result<Task> {
        let task = self
            .tasks
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task {id} not found")))?;
        if !predicates::can_read_task(actor, &task) {
            return Err(AppError::Forbidden(
                "task is not visible to this profile".into(),
            ));
        }
        Ok(task)
    }

    /// List tasks visible to the actor.
    ///
    /// Staff see every task; everyone else sees only tasks they are
    /// assignee or creator of (the read predicate pushed into the query).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn list_for(&self, actor: &Actor) -> Result<Vec<Task>> {
        if actor.role.is_staff() {
            self.tasks.list_all().await
        } else {
            self.tasks.list_for_member(&actor.profile_id).await
        }
    }

    /// Update staff-editable fields.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for non-staff callers,
    /// `AppError::ConstraintViolation` for an empty replacement title,
    /// `AppError::NotFound` for an unknown task or assignee.
    pub async fn update_fields(
        &self,
        actor: &Actor,
        id: &str,
        update: TaskFieldUpdate,
    ) -> Result<Task> {
        if !predicates::can_update_task(actor) {
            return Err(AppError::Forbidden(
                "only employees and admins may edit tasks".into(),
            ));
        }

        if let Some(ref title) = update.title {
            if title.trim().is_empty() {
                return Err(AppError::ConstraintViolation(
                    "task title must not be empty".into(),
                ));
            }
        }
        if let Some(Some(ref assignee_id)) = update.assignee_id {
            self.require_profile(assignee_id).await?;
        }

        self.tasks.update_fields(id, &update).await
    }

    /// Apply an actor-initiated status transition.
    ///
    /// Re-submitting the current status is an accepted no-op. `Overdue`
    /// is system-managed and never a legal target here.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown task,
    /// `AppError::Forbidden` if the actor is neither assignee nor staff,
    /// and `AppError::InvalidTransition` for any target that is not an
    /// allowed successor of the current status.
    pub async fn transition(&self, actor: &Actor, id: &str, next: TaskStatus) -> Result<Task> {
        let task = self
            .tasks
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task {id} not found")))?;

        if !predicates::can_transition_task(actor, &task) {
            return Err(AppError::Forbidden(
                "only the assignee or staff may change task status".into(),
            ));
        }

        if task.status == next {
            return Ok(task);
        }
        if next == TaskStatus::Overdue {
            return Err(AppError::InvalidTransition(
                "overdue is applied by the system, not by request".into(),
            ));
        }
        if !task.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition(format!(
                "cannot move task from {} to {}",
                status_str(task.status),
                status_str(next)
            )));
        }

        self.apply(task, next).await
    }

    /// Apply the system-initiated overdue transition.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown task, or
    /// `AppError::InvalidTransition` when the task is already terminal.
    pub async fn mark_overdue(&self, id: &str) -> Result<Task> {
        let task = self
            .tasks
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task {id} not found")))?;

        if task.status == TaskStatus::Overdue {
            return Ok(task);
        }
        if !task.status.can_transition_to(TaskStatus::Overdue) {
            return Err(AppError::InvalidTransition(format!(
                "cannot mark {} task overdue",
                status_str(task.status)
            )));
        }

        self.apply(task, TaskStatus::Overdue).await
    }

    /// Mark every task past its due date overdue; returns the count.
    ///
    /// Individual failures are logged and skipped so one bad row cannot
    /// stall the sweep.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the candidate query fails.
    pub async fn sweep_overdue(&self, now: DateTime<Utc>) -> Result<u64> {
        let due = self.tasks.list_due_for_sweep(now).await?;
        let mut marked = 0u64;
        for task in due {
            match self.mark_overdue(&task.id).await {
                Ok(_) => marked += 1,
                Err(err) => {
                    warn!(task_id = %task.id, %err, "overdue sweep skipped task");
                }
            }
        }
        if marked > 0 {
            info!(marked, "overdue sweep completed");
        }
        Ok(marked)
    }

    /// Delete a task; admin only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for non-admin callers, or
    /// `AppError::NotFound` if the task does not exist.
    pub async fn delete(&self, actor: &Actor, id: &str) -> Result<()> {
        if !predicates::can_delete_task(actor) {
            return Err(AppError::Forbidden("only admins may delete tasks".into()));
        }
        self.tasks.delete(id).await?;
        info!(task_id = %id, deleted_by = %actor.profile_id, "task deleted");
        Ok(())
    }

    /// Validate and persist a transition together with its points effect.
    async fn apply(&self, task: Task, next: TaskStatus) -> Result<Task> {
        let balance = points::status_change_entry(task.status, next, task.points).and_then(
            |entry| {
                task.assignee_id.clone().map(|profile_id| BalanceDelta {
                    profile_id,
                    delta: entry.signed_delta(),
                })
            },
        );

        let updated = self
            .tasks
            .apply_transition(&task.id, task.status, next, balance)
            .await?;
        info!(
            task_id = %task.id,
            from = status_str(task.status),
            to = status_str(updated.status),
            "task status transition applied"
        );
        Ok(updated)
    }

    async fn require_profile(&self, profile_id: &str) -> Result<()> {
        self.profiles
            .get_by_id(profile_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("profile {profile_id} not found")))
    }
}
