//! File upload metadata repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::upload::FileUpload;
use crate::{AppError, Result};

use super::db::Database;

/// Repository wrapper around `SQLite` for upload metadata records.
#[derive(Clone)]
pub struct UploadRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct UploadRow {
    id: String,
    stored_name: String,
    original_name: String,
    storage_path: String,
    size_bytes: i64,
    mime_type: String,
    checksum: String,
    uploader_id: String,
    task_id: Option<String>,
    created_at: String,
}

impl UploadRow {
    /// Convert a database row into the domain model.
    fn into_upload(self) -> Result<FileUpload> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AppError::Upstream(format!("invalid created_at: {e}")))?;
        Ok(FileUpload {
            created_at,
            id: self.id,
            stored_name: self.stored_name,
            original_name: self.original_name,
            storage_path: self.storage_path,
            size_bytes: self.size_bytes,
            mime_type: self.mime_type,
            checksum: self.checksum,
            uploader_id: self.uploader_id,
            task_id: self.task_id,
        })
    }
}

impl UploadRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new upload metadata record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the database insert fails.
    pub async fn create(&self, upload: &FileUpload) -> Result<FileUpload> {
        sqlx::query(
            "INSERT INTO file_upload (id, stored_name, original_name, storage_path, size_bytes,
             mime_type, checksum, uploader_id, task_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&upload.id)
        .bind(&upload.stored_name)
        .bind(&upload.original_name)
        .bind(&upload.storage_path)
        .bind(upload.size_bytes)
        .bind(&upload.mime_type)
        .bind(&upload.checksum)
        .bind(&upload.uploader_id)
        .bind(&upload.task_id)
        .bind(upload.created_at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;

        Ok(upload.clone())
    }

    /// Retrieve an upload by identifier.
    ///
    /// Returns `Ok(None)` if the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FileUpload>> {
        let row: Option<UploadRow> = sqlx::query_as("SELECT * FROM file_upload WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;

        row.map(UploadRow::into_upload).transpose()
    }

    /// List uploads attached to a task, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn list_for_task(&self, task_id: &str) -> Result<Vec<FileUpload>> {
        let rows: Vec<UploadRow> = sqlx::query_as(
            "SELECT * FROM file_upload WHERE task_id = ?1 ORDER BY created_at DESC",
        )
        .bind(task_id)
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(UploadRow::into_upload).collect()
    }

    /// List uploads created by a profile, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn list_for_uploader(&self, uploader_id: &str) -> Result<Vec<FileUpload>> {
        let rows: Vec<UploadRow> = sqlx::query_as(
            "SELECT * FROM file_upload WHERE uploader_id = ?1 ORDER BY created_at DESC",
        )
        .bind(uploader_id)
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(UploadRow::into_upload).collect()
    }
}
