use thiserror::Error;

/// Errors raised by the session core.
///
/// Storage and device failures are normally logged and swallowed by the
/// flows; the variants exist so the fallible layers underneath can use `?`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Photo list encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not a local file handle: {0}")]
    InvalidHandle(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
