//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` — safe to
//! re-run on every server startup. Produces a convergent result.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// Creates all four tables idempotently. Safe to call on every startup.
///
/// # Errors
///
/// Returns `AppError::Upstream` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS profile (
    id              TEXT PRIMARY KEY NOT NULL,
    identity_id     TEXT NOT NULL UNIQUE,
    email           TEXT NOT NULL,
    display_name    TEXT,
    role            TEXT NOT NULL CHECK(role IN ('intern','employee','admin')),
    department      TEXT,
    points          INTEGER NOT NULL DEFAULT 0 CHECK(points >= 0),
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS task (
    id              TEXT PRIMARY KEY NOT NULL,
    title           TEXT NOT NULL,
    description     TEXT,
    status          TEXT NOT NULL CHECK(status IN ('pending','in_progress','completed','overdue')),
    priority        TEXT NOT NULL CHECK(priority IN ('low','medium','high')),
    points          INTEGER NOT NULL CHECK(points > 0),
    due_date        TEXT,
    assignee_id     TEXT,
    created_by      TEXT,
    completed_at    TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chat_message (
    id              TEXT PRIMARY KEY NOT NULL,
    sender_id       TEXT NOT NULL,
    receiver_id     TEXT NOT NULL,
    content         TEXT NOT NULL,
    read_at         TEXT,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS file_upload (
    id              TEXT PRIMARY KEY NOT NULL,
    stored_name     TEXT NOT NULL,
    original_name   TEXT NOT NULL,
    storage_path    TEXT NOT NULL,
    size_bytes      INTEGER NOT NULL,
    mime_type       TEXT NOT NULL,
    checksum        TEXT NOT NULL,
    uploader_id     TEXT NOT NULL,
    task_id         TEXT,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_task_assignee ON task(assignee_id);
CREATE INDEX IF NOT EXISTS idx_task_status ON task(status);
CREATE INDEX IF NOT EXISTS idx_chat_pair ON chat_message(sender_id, receiver_id);
CREATE INDEX IF NOT EXISTS idx_upload_task ON file_upload(task_id);
CREATE INDEX IF NOT EXISTS idx_upload_uploader ON file_upload(uploader_id);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
