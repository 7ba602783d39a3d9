use crate::PipelineError;
use std::sync::Arc;
use tokio::sync::Mutex;
use vault_storage::{SpaceId, StorageNetwork};

/// Name given to the space created on first use.
pub const DEFAULT_SPACE_NAME: &str = "MySpace";

/// Makes sure the storage session has a current space to work in.
///
/// Provisioning runs one caller at a time, so concurrent first uses of a
/// session share the single space the first of them creates. Clones share
/// that lock.
#[derive(Debug, Clone)]
pub struct SpaceManager {
    name: String,
    provisioning: Arc<Mutex<()>>,
}

impl Default for SpaceManager {
    fn default() -> Self {
        Self::new(DEFAULT_SPACE_NAME)
    }
}

impl SpaceManager {
    /// Create spaces under `name` when none exist.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provisioning: Arc::new(Mutex::new(())),
        }
    }

    /// The name new spaces are created under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the current space, selecting or creating one first if needed.
    ///
    /// An existing current space is returned as is. Otherwise the first
    /// listed space becomes current, and when there are none exactly one
    /// space is created.
    pub async fn ensure_active_space<N>(&self, network: &N) -> Result<SpaceId, PipelineError>
    where
        N: StorageNetwork + ?Sized,
    {
        let _provisioning = self.provisioning.lock().await;

        if let Some(current) = network.current_space().await {
            return Ok(current);
        }

        let spaces = network
            .list_spaces()
            .await
            .map_err(PipelineError::SpaceProvisioning)?;

        let space = match spaces.into_iter().next() {
            Some(existing) => {
                tracing::debug!(space = %existing.did, name = %existing.name, "reusing space");
                existing.did
            }
            None => {
                let created = network
                    .create_space(&self.name)
                    .await
                    .map_err(PipelineError::SpaceProvisioning)?;
                tracing::info!(space = %created.did, name = %created.name, "created space");
                created.did
            }
        };

        network
            .set_current_space(&space)
            .await
            .map_err(PipelineError::SpaceProvisioning)?;
        Ok(space)
    }
}
