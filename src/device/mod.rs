//! Device capability boundary
//!
//! The flows never touch hardware directly. They call these narrow
//! request/response traits:
//! - Camera capture and permission (camera.rs)
//! - System media library write (media_library.rs)
//! - Share sheet (share.rs)
//!
//! Permission denial is a normal outcome, not an error.

pub mod camera;
pub mod media_library;
pub mod share;

#[cfg(test)]
pub(crate) mod fakes;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::state::{Facing, Handle};

pub use camera::FolderCamera;
pub use media_library::DirectoryMediaLibrary;
pub use share::OutboxShare;

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionStatus {
    #[default]
    Undetermined,
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

#[async_trait]
pub trait Camera: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    /// Take one picture and return the handle of the stored file
    async fn take_picture(&self, facing: Facing) -> Result<Handle>;
}

#[async_trait]
pub trait MediaLibrary: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    async fn save_to_library(&self, handle: &Handle) -> Result<()>;
}

#[async_trait]
pub trait ShareSheet: Send + Sync {
    async fn is_available(&self) -> bool;

    async fn share(&self, handle: &Handle) -> Result<()>;
}

/// Everything the capture flow needs from the device
#[derive(Clone)]
pub struct DeviceCapabilities {
    pub camera: Arc<dyn Camera>,
    pub media_library: Arc<dyn MediaLibrary>,
    pub share_sheet: Arc<dyn ShareSheet>,
}

impl DeviceCapabilities {
    /// Desktop capabilities backed by plain directories
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let camera = FolderCamera::new(config.camera_source_dir()?, config.capture_dir()?);

        let media_permission = if config.media_library_permission {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        let media_library = DirectoryMediaLibrary::new(config.media_library_dir()?, media_permission);

        let share_sheet = OutboxShare::new(config.share_outbox_dir.clone());

        Ok(Self {
            camera: Arc::new(camera),
            media_library: Arc::new(media_library),
            share_sheet: Arc::new(share_sheet),
        })
    }
}
