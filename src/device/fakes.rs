//! Scripted device capabilities for flow tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{Camera, DeviceCapabilities, MediaLibrary, PermissionStatus, ShareSheet};
use crate::error::{Result, SessionError};
use crate::state::{Facing, Handle};

/// Camera returning queued handles in order; an empty queue is a hardware fault
pub struct ScriptedCamera {
    pub permission: Mutex<PermissionStatus>,
    pub shots: Mutex<VecDeque<Handle>>,
    pub facings: Mutex<Vec<Facing>>,
}

impl ScriptedCamera {
    pub fn new(shots: &[&str]) -> Self {
        Self {
            permission: Mutex::new(PermissionStatus::Granted),
            shots: Mutex::new(shots.iter().map(|s| Handle::from(*s)).collect()),
            facings: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Camera for ScriptedCamera {
    async fn request_permission(&self) -> PermissionStatus {
        *self.permission.lock().unwrap()
    }

    async fn take_picture(&self, facing: Facing) -> Result<Handle> {
        self.facings.lock().unwrap().push(facing);
        self.shots
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SessionError::CameraUnavailable("shutter jammed".to_string()))
    }
}

pub struct RecordingMediaLibrary {
    pub permission: PermissionStatus,
    pub fail_writes: bool,
    pub saved: Mutex<Vec<Handle>>,
}

impl RecordingMediaLibrary {
    pub fn new(permission: PermissionStatus) -> Self {
        Self {
            permission,
            fail_writes: false,
            saved: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MediaLibrary for RecordingMediaLibrary {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission
    }

    async fn save_to_library(&self, handle: &Handle) -> Result<()> {
        if self.fail_writes {
            return Err(SessionError::Config("library full".to_string()));
        }
        self.saved.lock().unwrap().push(handle.clone());
        Ok(())
    }
}

pub struct RecordingShare {
    pub available: bool,
    pub shared: Mutex<Vec<Handle>>,
}

impl RecordingShare {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            shared: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ShareSheet for RecordingShare {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn share(&self, handle: &Handle) -> Result<()> {
        self.shared.lock().unwrap().push(handle.clone());
        Ok(())
    }
}

/// The fakes plus the bundle built from them, so tests can inspect both
pub struct FakeDevices {
    pub camera: Arc<ScriptedCamera>,
    pub media_library: Arc<RecordingMediaLibrary>,
    pub share_sheet: Arc<RecordingShare>,
}

impl FakeDevices {
    pub fn new(shots: &[&str]) -> Self {
        Self::with(
            ScriptedCamera::new(shots),
            RecordingMediaLibrary::new(PermissionStatus::Granted),
            RecordingShare::new(true),
        )
    }

    pub fn with(
        camera: ScriptedCamera,
        media_library: RecordingMediaLibrary,
        share_sheet: RecordingShare,
    ) -> Self {
        Self {
            camera: Arc::new(camera),
            media_library: Arc::new(media_library),
            share_sheet: Arc::new(share_sheet),
        }
    }

    pub fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities {
            camera: self.camera.clone(),
            media_library: self.media_library.clone(),
            share_sheet: self.share_sheet.clone(),
        }
    }
}
