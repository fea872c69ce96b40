//! File upload metadata model and attachment validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard ceiling on attachment size: 5 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types accepted for attachments: images, PDF, plain text, Word.
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Filename extensions accepted for attachments, lowercase.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "pdf", "txt", "doc", "docx",
];

/// Metadata record for a stored blob.
///
/// Created only after the blob write succeeds; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileUpload {
    /// Unique record identifier.
    pub id: String,
    /// Generated storage filename (uuid + original extension).
    pub stored_name: String,
    /// Filename as supplied by the uploader.
    pub original_name: String,
    /// Blob store path, namespaced by uploader id.
    pub storage_path: String,
    /// Blob size in bytes; at most [`MAX_UPLOAD_BYTES`].
    pub size_bytes: i64,
    /// Declared MIME type; must be on the allow-list.
    pub mime_type: String,
    /// SHA-256 hex digest of the stored bytes.
    pub checksum: String,
    /// Uploading profile.
    pub uploader_id: String,
    /// Optional task the file is attached to.
    pub task_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl FileUpload {
    /// Construct an upload record for a blob already written at `storage_path`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stored_name: String,
        original_name: String,
        storage_path: String,
        size_bytes: i64,
        mime_type: String,
        checksum: String,
        uploader_id: String,
        task_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stored_name,
            original_name,
            storage_path,
            size_bytes,
            mime_type,
            checksum,
            uploader_id,
            task_id,
            created_at: Utc::now(),
        }
    }
}

/// Whether `mime` is on the attachment allow-list.
#[must_use]
pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// Extract the lowercase extension of a filename, if any.
#[must_use]
pub fn file_extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Whether the filename carries an allow-listed extension.
#[must_use]
pub fn is_allowed_extension(name: &str) -> bool {
    file_extension(name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}
