use std::sync::Arc;
use tracing::{info, warn};

use crate::device::{Camera, DeviceCapabilities, MediaLibrary, PermissionStatus, ShareSheet};
use crate::error::{Result, SessionError};
use crate::state::{Facing, Handle, PhotoList, PhotoStore};

/// Capture flow: camera preview, shutter, and the just-taken photo.
pub struct CameraFlow {
    store: PhotoStore,
    camera: Arc<dyn Camera>,
    media_library: Arc<dyn MediaLibrary>,
    share_sheet: Arc<dyn ShareSheet>,
    /// Which camera shoots
    facing: Facing,
    /// Captured photo awaiting save/share
    active_preview: Option<Handle>,
    /// Working copy, loaded once at start
    photos: PhotoList,
    /// Last answer from the camera permission prompt
    permission: PermissionStatus,
}

impl CameraFlow {
    /// Start the flow. The working list is read from the store exactly once, here.
    pub async fn start(store: PhotoStore, devices: &DeviceCapabilities) -> Self {
        let photos = store.load().await;
        info!("📷 Camera ready with {} photos in session", photos.len());

        Self {
            store,
            camera: Arc::clone(&devices.camera),
            media_library: Arc::clone(&devices.media_library),
            share_sheet: Arc::clone(&devices.share_sheet),
            facing: Facing::default(),
            active_preview: None,
            photos,
            permission: PermissionStatus::Undetermined,
        }
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn active_preview(&self) -> Option<&Handle> {
        self.active_preview.as_ref()
    }

    pub fn photos(&self) -> &PhotoList {
        &self.photos
    }

    pub fn permission(&self) -> PermissionStatus {
        self.permission
    }

    /// Ask for camera access; the shutter stays disabled until granted
    pub async fn request_permission(&mut self) -> PermissionStatus {
        self.permission = self.camera.request_permission().await;
        if !self.permission.is_granted() {
            info!("Camera permission not granted");
        }
        self.permission
    }

    /// Take a picture, prepend it to the working list and persist the list.
    ///
    /// A failed capture logs and leaves every piece of state untouched.
    pub async fn capture(&mut self) -> Result<Handle> {
        if !self.permission.is_granted() {
            warn!("Capture attempted without camera permission");
            return Err(SessionError::PermissionDenied("camera".to_string()));
        }

        let handle = match self.camera.take_picture(self.facing).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Failed to take picture: {}", e);
                return Err(e);
            }
        };

        self.active_preview = Some(handle.clone());
        self.photos = self.photos.with_prepended(handle.clone());
        self.store.save(&self.photos).await;

        Ok(handle)
    }

    /// Write the previewed photo to the media library.
    ///
    /// Returns the saved handle; `None` when permission is denied, nothing is
    /// previewed, or the write failed (the preview is kept in that case).
    pub async fn confirm_save(&mut self) -> Option<Handle> {
        let status = self.media_library.request_permission().await;
        if !status.is_granted() {
            info!("Media library permission not granted");
            return None;
        }

        let handle = self.active_preview.clone()?;
        if let Err(e) = self.media_library.save_to_library(&handle).await {
            warn!("Failed to save {} to media library: {}", handle, e);
            return None;
        }

        self.active_preview = None;
        Some(handle)
    }

    /// Hand the previewed photo to the share sheet, if sharing is available
    pub async fn share(&mut self) -> Option<Handle> {
        if !self.share_sheet.is_available().await {
            return None;
        }
        let handle = self.active_preview.clone()?;

        if let Err(e) = self.share_sheet.share(&handle).await {
            warn!("Failed to share {}: {}", handle, e);
        }
        self.active_preview = None;
        Some(handle)
    }

    pub fn toggle_facing(&mut self) -> Facing {
        self.facing = self.facing.toggled();
        self.facing
    }

    /// Working list as handed to the gallery on navigation
    pub fn gallery_seed(&self) -> PhotoList {
        self.photos.clone()
    }
}
