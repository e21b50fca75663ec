//! Screen flows
//!
//! Each flow holds its own working copy of the photo list and re-fetches
//! from the durable store at fixed entry points:
//! - Capture flow loads once when it starts (camera.rs)
//! - Gallery flow reloads every time it becomes visible (gallery.rs)

pub mod camera;
pub mod gallery;

pub use camera::CameraFlow;
pub use gallery::{DeleteChoice, DeletePrompt, GalleryFlow, GalleryRow};
