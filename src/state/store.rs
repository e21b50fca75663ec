use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::data::PhotoList;
use super::storage::{KeyValueStorage, MemoryStorage};
use crate::error::Result;

/// Storage key holding the serialized photo list
pub const PHOTOS_KEY: &str = "photos";

/// The persisted photo store: one durable slot holding the whole list.
///
/// This is the single source of truth. Flows hold snapshots of it and
/// re-fetch at their entry points. Every mutation rewrites the full list;
/// concurrent writers resolve as last-write-wins.
///
/// Cloning is cheap and clones share the same slot and revision channel.
#[derive(Clone)]
pub struct PhotoStore {
    storage: Arc<dyn KeyValueStorage>,
    revision: Arc<watch::Sender<u64>>,
}

impl PhotoStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            storage,
            revision: Arc::new(revision),
        }
    }

    /// Store backed by process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Load the durable list, degrading to an empty list on any failure.
    pub async fn load(&self) -> PhotoList {
        match self.try_load().await {
            Ok(photos) => photos,
            Err(e) => {
                warn!("Failed to load photos: {}", e);
                PhotoList::new()
            }
        }
    }

    /// Load the durable list. An absent or empty slot is an empty list.
    pub async fn try_load(&self) -> Result<PhotoList> {
        let storage = Arc::clone(&self.storage);
        let raw = tokio::task::spawn_blocking(move || storage.get_item(PHOTOS_KEY)).await??;

        match raw {
            Some(json) if !json.trim().is_empty() => Ok(PhotoList::from_json(&json)?),
            _ => Ok(PhotoList::new()),
        }
    }

    /// Overwrite the durable list. Failures are logged, never retried.
    pub async fn save(&self, photos: &PhotoList) {
        if let Err(e) = self.try_save(photos).await {
            warn!("Failed to save photos: {}", e);
        }
    }

    /// Overwrite the durable list and publish a new revision on success.
    pub async fn try_save(&self, photos: &PhotoList) -> Result<()> {
        let json = photos.to_json()?;
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || storage.set_item(PHOTOS_KEY, &json)).await??;

        self.revision.send_modify(|revision| *revision += 1);
        debug!(count = photos.len(), revision = self.revision(), "photo list saved");
        Ok(())
    }

    /// Observe saves. The value is a counter bumped on every successful save.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Number of successful saves through this store so far
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }
}

impl std::fmt::Debug for PhotoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoStore")
            .field("storage", &self.storage)
            .field("revision", &self.revision())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::state::data::Handle;
    use crate::state::library::SqliteStorage;

    /// Storage whose every call fails
    #[derive(Debug)]
    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(SessionError::Config("disk unplugged".to_string()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(SessionError::Config("disk unplugged".to_string()))
        }

        fn remove_item(&self, _key: &str) -> Result<()> {
            Err(SessionError::Config("disk unplugged".to_string()))
        }
    }

    fn list(items: &[&str]) -> PhotoList {
        items.iter().map(|s| Handle::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_load_absent_key_is_empty() {
        let store = PhotoStore::in_memory();
        assert!(store.load().await.is_empty());
        assert!(store.try_load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips_order() {
        let store = PhotoStore::in_memory();
        let photos = list(&["file:///t/3.jpg", "file:///t/2.jpg", "file:///t/1.jpg"]);

        store.save(&photos).await;

        assert_eq!(store.load().await, photos);
    }

    #[tokio::test]
    async fn test_corrupt_value_loads_as_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(PHOTOS_KEY, "{not json").unwrap();
        let store = PhotoStore::new(storage);

        assert!(store.try_load().await.is_err());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_string_value_loads_as_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(PHOTOS_KEY, "").unwrap();
        let store = PhotoStore::new(storage);

        assert!(store.try_load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failures_are_soft() {
        let store = PhotoStore::new(Arc::new(BrokenStorage));

        assert!(store.load().await.is_empty());
        // Must not panic and must not count as a revision
        store.save(&list(&["a"])).await;
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_save() {
        let store = PhotoStore::in_memory();
        let mut changes = store.subscribe();

        store.save(&list(&["a"])).await;
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 1);

        // A clone shares the same slot and channel
        let other = store.clone();
        other.save(&list(&["b", "a"])).await;
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 2);
        assert_eq!(store.load().await, list(&["b", "a"]));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = PhotoStore::in_memory();
        store.save(&list(&["from-camera", "old"])).await;
        store.save(&list(&["old"])).await;

        assert_eq!(store.load().await, list(&["old"]));
    }

    #[tokio::test]
    async fn test_list_survives_restart_on_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("photos.db");
        let saved = list(&["file:///t/2.jpg", "file:///t/1.jpg"]);

        {
            let store = PhotoStore::new(Arc::new(SqliteStorage::open(&db_path).unwrap()));
            store.try_save(&saved).await.unwrap();
        }

        let reopened = PhotoStore::new(Arc::new(SqliteStorage::open(&db_path).unwrap()));
        assert_eq!(reopened.load().await, saved);
    }
}
