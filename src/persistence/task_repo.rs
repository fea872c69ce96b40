//! Task repository for `SQLite` persistence.
//!
//! Status transitions and their points-balance effect are written in a
//! single transaction; the status write is conditional on the previously
//! observed status so concurrent identical transitions settle to exactly
//! one balance change.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::task::{Task, TaskPriority, TaskStatus};
use crate::{AppError, Result};

use super::db::Database;

/// Points-balance change applied atomically with a status write.
///
/// A negative delta is floored at zero in the database so a balance
/// never goes negative.
#[derive(Debug, Clone)]
pub struct BalanceDelta {
    /// Profile whose balance changes.
    pub profile_id: String,
    /// Signed points delta.
    pub delta: i64,
}

/// Repository wrapper around `SQLite` for task records.
#[derive(Clone)]
pub struct TaskRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    points: i64,
    due_date: Option<String>,
    assignee_id: Option<String>,
    created_by: Option<String>,
    completed_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TaskRow {
    /// Convert a database row into the domain model.
    fn into_task(self) -> Result<Task> {
        Ok(Task {
            status: parse_status(&self.status)?,
            priority: parse_priority(&self.priority)?,
            due_date: parse_opt_timestamp(self.due_date.as_deref(), "due_date")?,
            completed_at: parse_opt_timestamp(self.completed_at.as_deref(), "completed_at")?,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
            id: self.id,
            title: self.title,
            description: self.description,
            points: self.points,
            assignee_id: self.assignee_id,
            created_by: self.created_by,
        })
    }
}

fn parse_status(s: &str) -> Result<TaskStatus> {
    match s {
        "pending" => Ok(TaskStatus::Pending),
        "in_progress" => Ok(TaskStatus::InProgress),
        "completed" => Ok(TaskStatus::Completed),
        "overdue" => Ok(TaskStatus::Overdue),
        other => Err(AppError::Upstream(format!("invalid task status: {other}"))),
    }
}

/// Wire string for a task status.
pub fn status_str(s: TaskStatus) -> &'static str {
    match s {
        TaskStatus::Pending => "pending",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Completed => "completed",
        TaskStatus::Overdue => "overdue",
    }
}

fn parse_priority(s: &str) -> Result<TaskPriority> {
    match s {
        "low" => Ok(TaskPriority::Low),
        "medium" => Ok(TaskPriority::Medium),
        "high" => Ok(TaskPriority::High),
        other => Err(AppError::Upstream(format!("invalid priority: {other}"))),
    }
}

fn priority_str(p: TaskPriority) -> &'static str {
    match p {
        TaskPriority::Low => "low",
        TaskPriority::Medium => "medium",
        TaskPriority::High => "high",
    }
}

fn parse_timestamp(s: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Upstream(format!("invalid {column}: {e}")))
}

fn parse_opt_timestamp(s: Option<&str>, column: &str) -> Result<Option<DateTime<Utc>>> {
    s.map(|v| parse_timestamp(v, column)).transpose()
}

/// Staff-editable task fields; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskFieldUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New due date (`Some(None)` clears it).
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New assignee (`Some(None)` unassigns).
    pub assignee_id: Option<Option<String>>,
}

impl TaskRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new task record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the database insert fails.
    pub async fn create(&self, task: &Task) -> Result<Task> {
        sqlx::query(
            "INSERT INTO task (id, title, description, status, priority, points, due_date,
             assignee_id, created_by, completed_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(status_str(task.status))
        .bind(priority_str(task.priority))
        .bind(task.points)
        .bind(task.due_date.map(|dt| dt.to_rfc3339()))
        .bind(&task.assignee_id)
        .bind(&task.created_by)
        .bind(task.completed_at.map(|dt| dt.to_rfc3339()))
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;

        Ok(task.clone())
    }

    /// Retrieve a task by identifier.
    ///
    /// Returns `Ok(None)` if the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM task WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;

        row.map(TaskRow::into_task).transpose()
    }

    /// List all tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as("SELECT * FROM task ORDER BY created_at DESC")
            .fetch_all(self.db.as_ref())
            .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// List tasks the given profile is assignee or creator of, newest first.
    ///
    /// The ownership filter mirrors the read predicate so callers never
    /// see rows the policy layer would deny.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn list_for_member(&self, profile_id: &str) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT * FROM task WHERE assignee_id = ?1 OR created_by = ?1
             ORDER BY created_at DESC",
        )
        .bind(profile_id)
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// List tasks past their due date still in a sweepable status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn list_due_for_sweep(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT * FROM task
             WHERE status IN ('pending', 'in_progress')
               AND due_date IS NOT NULL AND due_date < ?1",
        )
        .bind(now.to_rfc3339())
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// Update staff-editable fields; untouched fields keep their value.
    ///
    /// The points value is deliberately not updatable — it is fixed at
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the task does not exist, or
    /// `AppError::Upstream` if the update fails.
    pub async fn update_fields(&self, id: &str, update: &TaskFieldUpdate) -> Result<Task> {
        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task {id} not found")))?;

        let title = update.title.clone().unwrap_or(current.title);
        let description = update.description.clone().unwrap_or(current.description);
        let priority = update.priority.unwrap_or(current.priority);
        let due_date = update.due_date.unwrap_or(current.due_date);
        let assignee_id = update.assignee_id.clone().unwrap_or(current.assignee_id);

        sqlx::query(
            "UPDATE task SET title = ?1, description = ?2, priority = ?3, due_date = ?4,
             assignee_id = ?5, updated_at = ?6 WHERE id = ?7",
        )
        .bind(&title)
        .bind(&description)
        .bind(priority_str(priority))
        .bind(due_date.map(|dt| dt.to_rfc3339()))
        .bind(&assignee_id)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(self.db.as_ref())
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task {id} not found")))
    }

    /// Apply a validated status transition and its balance effect atomically.
    ///
    /// The status write is guarded by `previous`: if another writer moved
    /// the task first, nothing is written. A lost race to an identical
    /// transition returns the stored task unchanged (the winner already
    /// applied the balance change); any other interleaving is an
    /// `InvalidTransition`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the task vanished,
    /// `AppError::InvalidTransition` on a conflicting concurrent change, or
    /// `AppError::Upstream` if the transaction fails.
    pub async fn apply_transition(
        &self,
        id: &str,
        previous: TaskStatus,
        next: TaskStatus,
        balance: Option<BalanceDelta>,
    ) -> Result<Task> {
        let now = Utc::now();
        let completed_at = (next == TaskStatus::Completed).then_some(now);

        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            "UPDATE task SET status = ?1, completed_at = ?2, updated_at = ?3
             WHERE id = ?4 AND status = ?5",
        )
        .bind(status_str(next))
        .bind(completed_at.map(|dt| dt.to_rfc3339()))
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(status_str(previous))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            let current = self
                .get_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("task {id} not found")))?;
            if current.status == next {
                return Ok(current);
            }
            return Err(AppError::InvalidTransition(format!(
                "task {id} moved to {} concurrently",
                status_str(current.status)
            )));
        }

        if let Some(delta) = balance {
            // MAX floors the balance at zero on debit.
            sqlx::query(
                "UPDATE profile SET points = MAX(points + ?1, 0), updated_at = ?2
                 WHERE id = ?3",
            )
            .bind(delta.delta)
            .bind(now.to_rfc3339())
            .bind(&delta.profile_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task {id} not found")))
    }

    /// Delete a task record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the task does not exist, or
    /// `AppError::Upstream` if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM task WHERE id = ?1")
            .bind(id)
            .execute(self.db.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("task {id} not found")));
        }
        Ok(())
    }
}
