//! Shared data structures for the photo session
//!
//! These types represent the data model that flows between
//! the durable store, the capture flow and the gallery flow.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";

/// Opaque identifier of a captured photo: its local file location.
///
/// The handle is the entire record. No timestamp or size is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a `file://` handle for a path on disk
    pub fn from_path(path: &Path) -> Self {
        Self(format!("{}{}", FILE_SCHEME, path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local filesystem path behind the handle.
    /// Bare paths are accepted as-is; other URI schemes yield `None`.
    pub fn to_path(&self) -> Option<PathBuf> {
        if let Some(rest) = self.0.strip_prefix(FILE_SCHEME) {
            return Some(PathBuf::from(rest));
        }
        if self.0.contains("://") {
            return None;
        }
        Some(PathBuf::from(&self.0))
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Handle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Handle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Ordered list of photo handles, newest first.
///
/// Lists are treated as values: mutations return a new list so the
/// working copy and the copy handed to the store never alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoList(Vec<Handle>);

impl PhotoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn handles(&self) -> &[Handle] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Handle> {
        self.0.iter()
    }

    pub fn contains(&self, handle: &Handle) -> bool {
        self.0.contains(handle)
    }

    /// Copy of this list with `handle` at the front
    pub fn with_prepended(&self, handle: Handle) -> Self {
        let mut handles = Vec::with_capacity(self.0.len() + 1);
        handles.push(handle);
        handles.extend(self.0.iter().cloned());
        Self(handles)
    }

    /// Copy of this list with every entry equal to `handle` removed.
    /// Remaining entries keep their relative order.
    pub fn without(&self, handle: &Handle) -> Self {
        self.0.iter().filter(|h| *h != handle).cloned().collect()
    }

    /// Convert to JSON string for durable storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string (from durable storage)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FromIterator<Handle> for PhotoList {
    fn from_iter<I: IntoIterator<Item = Handle>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PhotoList {
    type Item = &'a Handle;
    type IntoIter = std::slice::Iter<'a, Handle>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Handle>> for PhotoList {
    fn from(handles: Vec<Handle>) -> Self {
        Self(handles)
    }
}

/// Which camera the capture flow shoots with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Back,
    Front,
}

impl Facing {
    pub fn toggled(self) -> Self {
        match self {
            Facing::Back => Facing::Front,
            Facing::Front => Facing::Back,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Facing::Back => "back",
            Facing::Front => "front",
        }
    }
}
