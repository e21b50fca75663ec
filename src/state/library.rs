use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::storage::KeyValueStorage;
use crate::error::{Result, SessionError};

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed key-value storage.
///
/// Each call opens its own connection: `rusqlite::Connection` is not `Sync`,
/// and calls arrive on whichever blocking-pool thread picks them up.
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Open (or create) the database at `db_path` and initialize the schema.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let storage = SqliteStorage { db_path };
        let conn = storage.connect()?;
        Self::init_schema(&conn)?;

        info!("📁 Photo database initialized at: {}", storage.db_path.display());

        Ok(storage)
    }

    /// Open the database at its default location.
    ///
    /// - Linux: ~/.local/share/photo-session/photo_session.db
    /// - macOS: ~/Library/Application Support/photo-session/photo_session.db
    /// - Windows: %APPDATA%\photo-session\photo_session.db
    pub fn open_default() -> Result<Self> {
        let path = Self::default_db_path().ok_or_else(|| {
            SessionError::Config("could not determine user data directory".to_string())
        })?;
        Self::open(path)
    }

    /// Get the path where the database is stored by default
    pub fn default_db_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("photo-session");
        path.push("photo_session.db");
        Some(path)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Create the key-value table if it doesn't exist
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key             TEXT PRIMARY KEY NOT NULL,
                value           TEXT NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        // Single upsert statement: the old value is replaced atomically
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage")
            .field("db_path", &self.db_path)
            .finish()
    }
}
