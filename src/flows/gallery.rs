use tracing::{debug, info};

use crate::state::{Handle, PhotoList, PhotoStore};

/// Confirmation prompt shown before a photo is deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub handle: Handle,
    pub title: &'static str,
    pub message: &'static str,
}

impl DeletePrompt {
    fn new(handle: Handle) -> Self {
        Self {
            handle,
            title: "Delete Photo",
            message: "Are you sure you want to delete this photo?",
        }
    }
}

/// The two answers the delete prompt accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteChoice {
    Cancel,
    Confirm,
}

/// One rendered gallery entry, keyed by its handle rather than its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryRow<'a> {
    pub key: &'a str,
    pub handle: &'a Handle,
}

/// Gallery flow: browse the session photos and delete them.
pub struct GalleryFlow {
    store: PhotoStore,
    /// Working copy; replaced wholesale on every visibility
    photos: PhotoList,
    pending_delete: Option<DeletePrompt>,
}

impl GalleryFlow {
    /// Create the flow with the list carried by navigation, if any.
    /// The seed is only shown until the first `on_become_visible`.
    pub fn new(store: PhotoStore, seed: Option<PhotoList>) -> Self {
        Self {
            store,
            photos: seed.unwrap_or_default(),
            pending_delete: None,
        }
    }

    pub fn photos(&self) -> &PhotoList {
        &self.photos
    }

    /// Rows to render, in list order
    pub fn rows(&self) -> impl Iterator<Item = GalleryRow<'_>> {
        self.photos.iter().map(|handle| GalleryRow {
            key: handle.as_str(),
            handle,
        })
    }

    /// Reconcile with the durable store. Called on every focus, not just the first.
    pub async fn on_become_visible(&mut self) -> &PhotoList {
        self.photos = self.store.load().await;
        debug!("Gallery reloaded {} photos", self.photos.len());
        &self.photos
    }

    pub fn pending_delete(&self) -> Option<&DeletePrompt> {
        self.pending_delete.as_ref()
    }

    /// Open the confirmation prompt for `handle`. Replaces any open prompt.
    pub fn request_delete(&mut self, handle: Handle) -> &DeletePrompt {
        self.pending_delete.insert(DeletePrompt::new(handle))
    }

    /// Close the prompt. On confirm, drop every entry equal to the prompted
    /// handle and persist the reduced list. Returns whether anything was deleted.
    pub async fn resolve_delete(&mut self, choice: DeleteChoice) -> bool {
        let Some(prompt) = self.pending_delete.take() else {
            return false;
        };

        match choice {
            DeleteChoice::Cancel => false,
            DeleteChoice::Confirm => {
                self.delete(&prompt.handle).await;
                true
            }
        }
    }

    async fn delete(&mut self, handle: &Handle) {
        self.photos = self.photos.without(handle);
        info!("🗑️  Deleted {} ({} photos left)", handle, self.photos.len());
        self.store.save(&self.photos).await;
    }
}
