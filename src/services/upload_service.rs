//! File attachment service: validation, blob write, metadata record.
//!
//! Uploads are a two-phase saga: all validation happens before any blob
//! byte is written, the blob goes in first, and the metadata record
//! second. If the metadata write fails the blob is removed best-effort
//! so no orphan survives the failed saga.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::upload::{
    file_extension, is_allowed_extension, is_allowed_mime, FileUpload, MAX_UPLOAD_BYTES,
};
use crate::persistence::db::Database;
use crate::persistence::task_repo::TaskRepo;
use crate::persistence::upload_repo::UploadRepo;
use crate::policy::predicates;
use crate::policy::Actor;
use crate::storage::{sha256_hex, BlobStore};
use crate::{AppError, Result};

/// Parameters for creating an upload.
#[derive(Debug, Clone)]
pub struct NewUpload {
    /// Filename as supplied by the uploader.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Optional task the file attaches to.
    pub task_id: Option<String>,
    /// File content.
    pub bytes: Bytes,
}

/// Service running the upload saga and gated reads.
#[derive(Clone)]
pub struct UploadService {
    uploads: UploadRepo,
    tasks: TaskRepo,
    blobs: Arc<dyn BlobStore>,
}

impl UploadService {
    /// Create a new service instance.
    #[must_use]
    pub fn new(db: Arc<Database>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            uploads: UploadRepo::new(Arc::clone(&db)),
            tasks: TaskRepo::new(db),
            blobs,
        }
    }

    /// Run the upload saga under the caller's identity.
    ///
    /// Size, MIME type, extension, and task reference are all checked
    /// before the blob write so an invalid upload never touches storage.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConstraintViolation` for an oversized payload,
    /// a disallowed MIME type or extension, or an empty filename;
    /// `AppError::NotFound` for an unknown task; `AppError::Upstream`
    /// if the blob or metadata write fails.
    pub async fn create(&self, actor: &Actor, new_upload: NewUpload) -> Result<FileUpload> {
        if !predicates::can_create_upload(actor, &actor.profile_id) {
            return Err(AppError::Forbidden(
                "uploads may only be created under the caller's own profile".into(),
            ));
        }

        let original_name = new_upload.original_name.trim().to_owned();
        if original_name.is_empty() {
            return Err(AppError::ConstraintViolation(
                "original filename must not be empty".into(),
            ));
        }
        if new_upload.bytes.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(AppError::ConstraintViolation(format!(
                "file exceeds the {MAX_UPLOAD_BYTES} byte ceiling"
            )));
        }
        if !is_allowed_mime(&new_upload.mime_type) {
            return Err(AppError::ConstraintViolation(format!(
                "mime type {} is not allowed",
                new_upload.mime_type
            )));
        }
        if !is_allowed_extension(&original_name) {
            return Err(AppError::ConstraintViolation(format!(
                "file extension of {original_name} is not allowed"
            )));
        }
        if let Some(ref task_id) = new_upload.task_id {
            self.tasks
                .get_by_id(task_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("task {task_id} not found")))?;
        }

        // Extension presence was just validated.
        let extension = file_extension(&original_name).unwrap_or_default();
        let stored_name = format!("{}.{extension}", Uuid::new_v4());
        let storage_path = format!("{}/{stored_name}", actor.profile_id);
        let checksum = sha256_hex(&new_upload.bytes);

        self.blobs.put(&storage_path, &new_upload.bytes).await?;

        let upload = FileUpload::new(
            stored_name,
            original_name,
            storage_path.clone(),
            i64::try_from(new_upload.bytes.len()).unwrap_or(i64::MAX),
            new_upload.mime_type,
            checksum,
            actor.profile_id.clone(),
            new_upload.task_id,
        );

        match self.uploads.create(&upload).await {
            Ok(created) => {
                info!(upload_id = %created.id, path = %storage_path, "upload stored");
                Ok(created)
            }
            Err(err) => {
                // Metadata write failed after the blob landed; reclaim it.
                if let Err(cleanup_err) = self.blobs.delete(&storage_path).await {
                    warn!(path = %storage_path, %cleanup_err, "orphaned blob left behind");
                }
                Err(err)
            }
        }
    }

    /// Fetch upload metadata the actor is allowed to read.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the record does not exist, or
    /// `AppError::Forbidden` if the actor is neither uploader nor
    /// assignee of the associated task.
    pub async fn get(&self, actor: &Actor, id: &str) -> Result<FileUpload> {
        let upload = self
            .uploads
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("upload {id} not found")))?;

        let task_assignee = match upload.task_id {
            Some(ref task_id) => self
                .tasks
                .get_by_id(task_id)
                .await?
                .and_then(|task| task.assignee_id),
            None => None,
        };

        if !predicates::can_read_upload(actor, &upload, task_assignee.as_deref()) {
            return Err(AppError::Forbidden(
                "upload is not visible to this profile".into(),
            ));
        }
        Ok(upload)
    }

    /// Fetch upload metadata together with the stored bytes.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`], plus `AppError::Upstream`/`NotFound` from
    /// the blob store.
    pub async fn content(&self, actor: &Actor, id: &str) -> Result<(FileUpload, Vec<u8>)> {
        let upload = self.get(actor, id).await?;
        let bytes = self.blobs.get(&upload.storage_path).await?;
        Ok((upload, bytes))
    }

    /// List uploads attached to a task the actor can read.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown task, or
    /// `AppError::Forbidden` if the task read predicate denies the actor.
    pub async fn list_for_task(&self, actor: &Actor, task_id: &str) -> Result<Vec<FileUpload>> {
        let task = self
            .tasks
            .get_by_id(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task {task_id} not found")))?;
        if !predicates::can_read_task(actor, &task) {
            return Err(AppError::Forbidden(
                "task is not visible to this profile".into(),
            ));
        }
        self.uploads.list_for_task(task_id).await
    }
}
