//! Local filesystem storage for session photos.
//!
//! Layout: `{root}/{session_id}/{photo_id}.jpg`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// Extension given to every stored photo regardless of the uploaded format.
pub const PHOTO_EXTENSION: &str = "jpg";

/// Photo storage rooted at the sessions directory.
#[derive(Clone, Debug)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a photo lives on disk.
    pub fn photo_path(&self, session_id: &str, photo_id: &str) -> AppResult<PathBuf> {
        validate_storage_id(session_id)?;
        validate_storage_id(photo_id)?;
        Ok(self
            .root
            .join(session_id)
            .join(format!("{}.{}", photo_id, PHOTO_EXTENSION)))
    }

    /// Write photo bytes, creating the session folder if needed.
    pub async fn put(&self, session_id: &str, photo_id: &str, data: &[u8]) -> AppResult<PathBuf> {
        let path = self.photo_path(session_id, photo_id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::FileSystem(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        fs::write(&path, data).await.map_err(|e| {
            AppError::FileSystem(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), bytes = data.len(), "Stored photo");
        Ok(path)
    }

    /// Read a stored photo.
    pub async fn read(&self, path: &Path) -> AppResult<Vec<u8>> {
        fs::read(path).await.map_err(|e| {
            AppError::FileSystem(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    /// Remove a stored photo. A file that is already gone is not an error.
    pub async fn delete(&self, path: &Path) -> AppResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Photo already removed");
                Ok(())
            }
            Err(e) => Err(AppError::FileSystem(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Check that `id` can be used as a single path component under the root.
///
/// Separators, NUL and the whole components `.` and `..` are refused;
/// dots inside a name (`ispezione..2026`) are fine.
pub fn validate_storage_id(id: &str) -> AppResult<()> {
    let ok = !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0']);
    if ok {
        Ok(())
    } else {
        Err(AppError::Unprocessable(format!(
            "Identificativo non valido: {}",
            id
        )))
    }
}
