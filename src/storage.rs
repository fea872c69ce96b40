//! Blob store abstraction and filesystem implementation.
//!
//! Attachment bytes live outside the database; the store keeps them
//! under a configured root, namespaced by uploader. Every path is
//! validated against the root so a crafted storage path cannot escape
//! it, and the size ceiling is re-checked here on top of the service
//! pre-check.

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;

use sha2::{Digest, Sha256};

use crate::models::upload::MAX_UPLOAD_BYTES;
use crate::{AppError, Result};

/// Persistent byte storage keyed by relative path.
///
/// The trait decouples the upload saga from the storage backend so the
/// service layer never touches the filesystem directly.
pub trait BlobStore: Send + Sync {
    /// Write `bytes` at `path`, failing on oversized payloads.
    fn put<'a>(
        &'a self,
        path: &'a str,
        bytes: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Read the bytes stored at `path`.
    fn get<'a>(
        &'a self,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;

    /// Remove the blob at `path`; absent blobs are not an error.
    fn delete<'a>(&'a self, path: &'a str)
        -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Filesystem-backed blob store rooted at a configured directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the root cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|err| AppError::Io(format!("failed to create blob root: {err}")))?;
        Ok(Self { root })
    }

    /// Resolve a relative blob path against the root, rejecting escapes.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let candidate = Path::new(path);
        let mut normalized = PathBuf::new();
        for component in candidate.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(AppError::ConstraintViolation(
                        "blob path must be relative to the store root".into(),
                    ));
                }
            }
        }
        if normalized.as_os_str().is_empty() {
            return Err(AppError::ConstraintViolation("empty blob path".into()));
        }
        Ok(self.root.join(normalized))
    }
}

impl BlobStore for FsBlobStore {
    fn put<'a>(
        &'a self,
        path: &'a str,
        bytes: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if bytes.len() as u64 > MAX_UPLOAD_BYTES {
                return Err(AppError::ConstraintViolation(format!(
                    "blob exceeds {MAX_UPLOAD_BYTES} byte ceiling"
                )));
            }
            let target = self.resolve(path)?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|err| AppError::Upstream(format!("blob dir create failed: {err}")))?;
            }
            tokio::fs::write(&target, bytes)
                .await
                .map_err(|err| AppError::Upstream(format!("blob write failed: {err}")))
        })
    }

    fn get<'a>(
        &'a self,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            let target = self.resolve(path)?;
            match tokio::fs::read(&target).await {
                Ok(bytes) => Ok(bytes),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    Err(AppError::NotFound(format!("blob {path} not found")))
                }
                Err(err) => Err(AppError::Upstream(format!("blob read failed: {err}"))),
            }
        })
    }

    fn delete<'a>(
        &'a self,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let target = self.resolve(path)?;
            match tokio::fs::remove_file(&target).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(AppError::Upstream(format!("blob delete failed: {err}"))),
            }
        })
    }
}

/// Compute SHA-256 hex digest of the given bytes.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
