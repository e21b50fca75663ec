use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{MediaLibrary, PermissionStatus};
use crate::error::{Result, SessionError};
use crate::state::Handle;

/// Media library backed by a pictures directory.
///
/// The permission answer is fixed at construction, standing in for the
/// system prompt.
pub struct DirectoryMediaLibrary {
    library_dir: PathBuf,
    permission: PermissionStatus,
}

impl DirectoryMediaLibrary {
    pub fn new(library_dir: impl Into<PathBuf>, permission: PermissionStatus) -> Self {
        Self {
            library_dir: library_dir.into(),
            permission,
        }
    }

    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }
}

#[async_trait]
impl MediaLibrary for DirectoryMediaLibrary {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission
    }

    async fn save_to_library(&self, handle: &Handle) -> Result<()> {
        let target = copy_into(handle, &self.library_dir).await?;
        info!("🖼️  Saved {} to media library at {}", handle, target.display());
        Ok(())
    }
}

/// Copy the file behind `handle` into `dir`, keeping its file name
pub(crate) async fn copy_into(handle: &Handle, dir: &Path) -> Result<PathBuf> {
    let source = handle
        .to_path()
        .ok_or_else(|| SessionError::InvalidHandle(handle.to_string()))?;
    let file_name = source
        .file_name()
        .ok_or_else(|| SessionError::InvalidHandle(handle.to_string()))?;

    tokio::fs::create_dir_all(dir).await?;
    let target = dir.join(file_name);
    tokio::fs::copy(&source, &target).await?;
    Ok(target)
}
