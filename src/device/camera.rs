//! Folder-backed camera
//!
//! Stands in for device hardware on desktop: each capture takes the next
//! frame from a source directory and writes it out as a fresh JPEG.

use async_trait::async_trait;
use chrono::Local;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{Camera, PermissionStatus};
use crate::error::{Result, SessionError};
use crate::state::{Facing, Handle};

/// Frame formats the camera will read
const FRAME_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub struct FolderCamera {
    /// Frames live in `<source>/back` and `<source>/front`, or directly in `<source>`
    source_dir: PathBuf,
    /// Where captured JPEGs are written
    capture_dir: PathBuf,
    /// Shots taken so far; picks the frame and disambiguates file names
    shots: AtomicUsize,
}

impl FolderCamera {
    pub fn new(source_dir: impl Into<PathBuf>, capture_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            capture_dir: capture_dir.into(),
            shots: AtomicUsize::new(0),
        }
    }

    pub fn capture_dir(&self) -> &Path {
        &self.capture_dir
    }
}

#[async_trait]
impl Camera for FolderCamera {
    async fn request_permission(&self) -> PermissionStatus {
        if self.source_dir.is_dir() {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn take_picture(&self, facing: Facing) -> Result<Handle> {
        let shot = self.shots.fetch_add(1, Ordering::SeqCst);
        let source_dir = self.source_dir.clone();
        let capture_dir = self.capture_dir.clone();

        // Spawn blocking because decoding and encoding are CPU-bound
        tokio::task::spawn_blocking(move || {
            capture_blocking(&source_dir, &capture_dir, facing, shot)
        })
        .await?
    }
}

/// Blocking implementation of a single capture
fn capture_blocking(
    source_dir: &Path,
    capture_dir: &Path,
    facing: Facing,
    shot: usize,
) -> Result<Handle> {
    let frames = frames_for(source_dir, facing);
    if frames.is_empty() {
        return Err(SessionError::CameraUnavailable(format!(
            "no frames in {}",
            source_dir.display()
        )));
    }
    let source = &frames[shot % frames.len()];

    let mut frame = image::open(source)?.to_rgb8();
    if facing == Facing::Front {
        // Front camera previews are mirrored
        frame = image::imageops::flip_horizontal(&frame);
    }

    std::fs::create_dir_all(capture_dir)?;
    let target = capture_dir.join(capture_file_name(shot));
    frame.save_with_format(&target, ImageFormat::Jpeg)?;

    info!("📸 Captured {} from {}", target.display(), source.display());
    Ok(Handle::from_path(&target))
}

/// Frames for the given facing, falling back to the source root
fn frames_for(source_dir: &Path, facing: Facing) -> Vec<PathBuf> {
    let facing_dir = source_dir.join(facing.as_str());
    let frames = list_frames(&facing_dir);
    if !frames.is_empty() {
        return frames;
    }
    debug!("No {} frames, using {}", facing.as_str(), source_dir.display());
    list_frames(source_dir)
}

fn list_frames(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect()
}

/// e.g. IMG_20261018_142501_123_0004.jpg
fn capture_file_name(shot: usize) -> String {
    format!("IMG_{}_{:04}.jpg", Local::now().format("%Y%m%d_%H%M%S_%3f"), shot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// 16x8 frame: left 8x8 block white, right block `color`
    fn write_frame(path: &Path, color: Rgb<u8>) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let frame = RgbImage::from_fn(16, 8, |x, _| if x < 8 { Rgb([255, 255, 255]) } else { color });
        frame.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_capture_writes_unique_jpegs() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        write_frame(&source.join("a.png"), Rgb([10, 20, 30]));
        let camera = FolderCamera::new(&source, dir.path().join("captures"));

        assert_eq!(camera.request_permission().await, PermissionStatus::Granted);

        let first = camera.take_picture(Facing::Back).await.unwrap();
        let second = camera.take_picture(Facing::Back).await.unwrap();

        assert_ne!(first, second);
        for handle in [&first, &second] {
            assert!(handle.as_str().starts_with("file://"));
            let path = handle.to_path().unwrap();
            assert!(path.starts_with(camera.capture_dir()));
            assert!(image::open(&path).is_ok());
        }
    }

    #[tokio::test]
    async fn test_front_frames_are_mirrored() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        write_frame(&source.join("front").join("selfie.png"), Rgb([0, 0, 0]));
        let camera = FolderCamera::new(&source, dir.path().join("captures"));

        let handle = camera.take_picture(Facing::Front).await.unwrap();
        let shot = image::open(handle.to_path().unwrap()).unwrap().to_rgb8();

        // The white half moved from the left to the right
        assert!(shot.get_pixel(12, 4)[0] > 200);
        assert!(shot.get_pixel(3, 4)[0] < 60);
    }

    #[tokio::test]
    async fn test_missing_source_is_denied_and_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let camera = FolderCamera::new(dir.path().join("nope"), dir.path().join("captures"));

        assert_eq!(camera.request_permission().await, PermissionStatus::Denied);
        let result = camera.take_picture(Facing::Back).await;
        assert!(matches!(result, Err(SessionError::CameraUnavailable(_))));
    }
}
