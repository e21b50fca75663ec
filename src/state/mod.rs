//! State management module
//!
//! This module handles the photo session state:
//! - The photo list data model (data.rs)
//! - The key-value storage seam and in-memory backend (storage.rs)
//! - The SQLite-backed durable slot (library.rs)
//! - The persisted photo store with load/save and change notification (store.rs)

pub mod data;
pub mod library;
pub mod storage;
pub mod store;

pub use data::{Facing, Handle, PhotoList};
pub use library::SqliteStorage;
pub use storage::{KeyValueStorage, MemoryStorage};
pub use store::{PhotoStore, PHOTOS_KEY};
