use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::media_library::copy_into;
use super::ShareSheet;
use crate::error::{Result, SessionError};
use crate::state::Handle;

/// Share target that drops files into an outbox directory.
/// Unavailable when no outbox is configured.
pub struct OutboxShare {
    outbox_dir: Option<PathBuf>,
}

impl OutboxShare {
    pub fn new(outbox_dir: Option<PathBuf>) -> Self {
        Self { outbox_dir }
    }
}

#[async_trait]
impl ShareSheet for OutboxShare {
    async fn is_available(&self) -> bool {
        self.outbox_dir.is_some()
    }

    async fn share(&self, handle: &Handle) -> Result<()> {
        let outbox = self
            .outbox_dir
            .as_ref()
            .ok_or_else(|| SessionError::Config("no share outbox configured".to_string()))?;
        let target = copy_into(handle, outbox).await?;
        info!("📤 Shared {} to {}", handle, target.display());
        Ok(())
    }
}
