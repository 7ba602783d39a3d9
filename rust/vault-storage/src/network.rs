use crate::{ContentId, SpaceId, SpaceInfo, StorageError};
use async_trait::async_trait;
use std::sync::Arc;
use vault_capability::{Abilities, Delegation, Did};

/// A session with the storage network, acting as one agent.
///
/// The session tracks which space is current; delegations and uploads
/// always target the current space.
#[async_trait]
pub trait StorageNetwork: Send + Sync {
    /// The agent this session acts as.
    fn agent(&self) -> Did;

    /// Spaces known to this session, in the order the network reports them.
    async fn list_spaces(&self) -> Result<Vec<SpaceInfo>, StorageError>;

    /// Create and provision a new space. Does not make it current.
    async fn create_space(&self, name: &str) -> Result<SpaceInfo, StorageError>;

    /// Make `space` the current space.
    async fn set_current_space(&self, space: &SpaceId) -> Result<(), StorageError>;

    /// The current space, if one has been selected.
    async fn current_space(&self) -> Option<SpaceId>;

    /// Delegate `abilities` on the current space to `audience`.
    async fn create_delegation(
        &self,
        audience: &Did,
        abilities: Abilities,
    ) -> Result<Delegation, StorageError>;

    /// Store `content` in the current space using `proof`, returning its
    /// content identifier.
    async fn upload_bytes(
        &self,
        content: Vec<u8>,
        proof: &Delegation,
    ) -> Result<ContentId, StorageError>;
}

#[async_trait]
impl<T: StorageNetwork + ?Sized> StorageNetwork for Arc<T> {
    fn agent(&self) -> Did {
        (**self).agent()
    }

    async fn list_spaces(&self) -> Result<Vec<SpaceInfo>, StorageError> {
        (**self).list_spaces().await
    }

    async fn create_space(&self, name: &str) -> Result<SpaceInfo, StorageError> {
        (**self).create_space(name).await
    }

    async fn set_current_space(&self, space: &SpaceId) -> Result<(), StorageError> {
        (**self).set_current_space(space).await
    }

    async fn current_space(&self) -> Option<SpaceId> {
        (**self).current_space().await
    }

    async fn create_delegation(
        &self,
        audience: &Did,
        abilities: Abilities,
    ) -> Result<Delegation, StorageError> {
        (**self).create_delegation(audience, abilities).await
    }

    async fn upload_bytes(
        &self,
        content: Vec<u8>,
        proof: &Delegation,
    ) -> Result<ContentId, StorageError> {
        (**self).upload_bytes(content, proof).await
    }
}
