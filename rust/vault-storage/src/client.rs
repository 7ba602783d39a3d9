use crate::{ContentId, Service, SpaceId, SpaceInfo, StorageError, StorageNetwork};
use async_trait::async_trait;
use tokio::sync::RwLock;
use vault_capability::{Abilities, Delegation, Did, Ed25519Signer, Principal};

struct Space {
    info: SpaceInfo,
    signer: Ed25519Signer,
}

/// An agent session with a storage [`Service`].
///
/// The client owns the agent identity and the signing keys of every space it
/// creates. Share it between tasks behind an `Arc`; the current space is
/// guarded by an async lock and the last writer wins.
pub struct Client<S> {
    agent: Ed25519Signer,
    service: S,
    spaces: RwLock<Vec<Space>>,
    current: RwLock<Option<SpaceId>>,
}

impl<S: Service> Client<S> {
    /// Create a session for `agent` against `service`.
    pub fn new(agent: Ed25519Signer, service: S) -> Self {
        Self {
            agent,
            service,
            spaces: RwLock::new(Vec::new()),
            current: RwLock::new(None),
        }
    }

    /// The remote service.
    pub fn service(&self) -> &S {
        &self.service
    }

    async fn space_signer(&self, space: &SpaceId) -> Option<Ed25519Signer> {
        self.spaces
            .read()
            .await
            .iter()
            .find(|record| &record.info.did == space)
            .map(|record| record.signer.clone())
    }
}

#[async_trait]
impl<S: Service> StorageNetwork for Client<S> {
    fn agent(&self) -> Did {
        self.agent.did()
    }

    async fn list_spaces(&self) -> Result<Vec<SpaceInfo>, StorageError> {
        Ok(self
            .spaces
            .read()
            .await
            .iter()
            .map(|record| record.info.clone())
            .collect())
    }

    async fn create_space(&self, name: &str) -> Result<SpaceInfo, StorageError> {
        let signer = Ed25519Signer::generate()?;
        let info = SpaceInfo {
            did: signer.did(),
            name: name.to_string(),
        };

        self.service.provision(&info.did, &self.agent.did()).await?;
        tracing::info!(space = %info.did, name, "provisioned space");

        self.spaces.write().await.push(Space {
            info: info.clone(),
            signer,
        });
        Ok(info)
    }

    async fn set_current_space(&self, space: &SpaceId) -> Result<(), StorageError> {
        let known = self
            .spaces
            .read()
            .await
            .iter()
            .any(|record| &record.info.did == space);

        if !known {
            return Err(StorageError::SpaceNotFound(space.clone()));
        }

        *self.current.write().await = Some(space.clone());
        tracing::debug!(%space, "selected current space");
        Ok(())
    }

    async fn current_space(&self) -> Option<SpaceId> {
        self.current.read().await.clone()
    }

    async fn create_delegation(
        &self,
        audience: &Did,
        abilities: Abilities,
    ) -> Result<Delegation, StorageError> {
        let space = self
            .current_space()
            .await
            .ok_or(StorageError::NoCurrentSpace)?;
        let signer = self
            .space_signer(&space)
            .await
            .ok_or_else(|| StorageError::SpaceNotFound(space.clone()))?;

        Ok(Delegation::builder()
            .audience(audience.clone())
            .abilities(abilities)
            .sign(&signer)?)
    }

    async fn upload_bytes(
        &self,
        content: Vec<u8>,
        proof: &Delegation,
    ) -> Result<ContentId, StorageError> {
        let space = self
            .current_space()
            .await
            .ok_or(StorageError::NoCurrentSpace)?;
        let root = ContentId::for_bytes(&content);
        let size = content.len();

        self.service.add_blob(&space, &root, content, proof).await?;
        self.service.register_upload(&space, &root, proof).await?;

        tracing::info!(%space, %root, size, "uploaded content");
        Ok(root)
    }
}
