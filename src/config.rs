//! Application configuration
//!
//! Read from a JSON file, `$PHOTO_SESSION_CONFIG` or
//! `<config_dir>/photo-session/config.json`. Every field has a default, so a
//! partial file works, and so does a missing file at the default location.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, SessionError};
use crate::state::SqliteStorage;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "PHOTO_SESSION_CONFIG";
/// Environment variable overriding `api_url`
pub const API_URL_ENV: &str = "PHOTO_SESSION_API_URL";

const APP_DIR: &str = "photo-session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the auth authority (`/login`, `/register`)
    pub api_url: String,
    pub request_timeout_secs: u64,
    /// SQLite file holding the photo list
    pub database_path: Option<PathBuf>,
    /// Frames the folder camera shoots from
    pub camera_source_dir: Option<PathBuf>,
    /// Where captured photos are written
    pub capture_dir: Option<PathBuf>,
    /// Target of "save to media library"
    pub media_library_dir: Option<PathBuf>,
    /// Answer given to the media library permission prompt
    pub media_library_permission: bool,
    /// Sharing is unavailable unless this is set
    pub share_outbox_dir: Option<PathBuf>,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5001".to_string(),
            request_timeout_secs: 30,
            database_path: None,
            camera_source_dir: None,
            capture_dir: None,
            media_library_dir: None,
            media_library_permission: true,
            share_outbox_dir: None,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the environment-selected file or the default location,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = Self::resolve(explicit.as_deref(), Self::default_path().as_deref())?;

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api_url = url;
        }
        Ok(config)
    }

    /// Pick the config file to read. An explicitly named file must exist;
    /// only the implicit default location may be missing.
    pub fn resolve(explicit: Option<&Path>, default: Option<&Path>) -> Result<Self> {
        match (explicit, default) {
            (Some(path), _) if !path.is_file() => Err(SessionError::Config(format!(
                "{} names {}, which does not exist",
                CONFIG_ENV,
                path.display()
            ))),
            (Some(path), _) => Self::load_from(path),
            (None, Some(path)) if path.is_file() => Self::load_from(path),
            (None, _) => Ok(Self::default()),
        }
    }

    /// Parse a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)
            .map_err(|e| SessionError::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(APP_DIR).join("config.json"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => SqliteStorage::default_db_path().ok_or_else(no_data_dir),
        }
    }

    pub fn camera_source_dir(&self) -> Result<PathBuf> {
        self.dir_or_data(&self.camera_source_dir, "camera")
    }

    pub fn capture_dir(&self) -> Result<PathBuf> {
        self.dir_or_data(&self.capture_dir, "captures")
    }

    /// Defaults to `<pictures>/photo-session`
    pub fn media_library_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.media_library_dir {
            return Ok(dir.clone());
        }
        match dirs::picture_dir() {
            Some(pictures) => Ok(pictures.join(APP_DIR)),
            None => self.dir_or_data(&None, "library"),
        }
    }

    fn dir_or_data(&self, configured: &Option<PathBuf>, leaf: &str) -> Result<PathBuf> {
        if let Some(dir) = configured {
            return Ok(dir.clone());
        }
        let data = dirs::data_dir().or_else(dirs::home_dir).ok_or_else(no_data_dir)?;
        Ok(data.join(APP_DIR).join(leaf))
    }
}

fn no_data_dir() -> SessionError {
    SessionError::Config("could not determine user data directory".to_string())
}
