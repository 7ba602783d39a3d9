//! In-process storage service for tests and local development.

use crate::{ContentId, Service, ServiceError, check_proof};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use vault_capability::{Ability, Delegation, Did};

#[derive(Debug, Default)]
struct SpaceState {
    owner: Option<Did>,
    blobs: HashMap<ContentId, Vec<u8>>,
    uploads: Vec<ContentId>,
}

#[derive(Debug, Default)]
struct ServiceState {
    unreachable: bool,
    verification_required: bool,
    spaces: HashMap<Did, SpaceState>,
}

/// A [`Service`] that keeps everything in memory.
///
/// It enforces the same rules as a real deployment: writes need a valid
/// proof from the space, blob bytes must hash to the claimed identifier, and
/// uploads can only reference stored blobs. Clones share the same state.
///
/// # Examples
///
/// ```
/// use vault_storage::{Client, MemoryService, StorageNetwork};
/// use vault_capability::{Abilities, Ed25519Signer};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = MemoryService::new();
/// let client = Client::new(Ed25519Signer::generate()?, service.clone());
///
/// let space = client.create_space("MySpace").await?;
/// client.set_current_space(&space.did).await?;
///
/// let proof = client.create_delegation(&client.agent(), Abilities::upload()).await?;
/// let content = client.upload_bytes(b"hello".to_vec(), &proof).await?;
///
/// assert_eq!(service.blob(&space.did, &content).await, Some(b"hello".to_vec()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryService {
    state: Arc<RwLock<ServiceState>>,
}

impl MemoryService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the service going offline (or coming back).
    pub async fn set_reachable(&self, reachable: bool) {
        self.state.write().await.unreachable = !reachable;
    }

    /// Refuse blob writes until the account is verified.
    pub async fn set_verification_required(&self, required: bool) {
        self.state.write().await.verification_required = required;
    }

    /// The bytes stored under `content` in `space`, if any.
    pub async fn blob(&self, space: &Did, content: &ContentId) -> Option<Vec<u8>> {
        let state = self.state.read().await;
        state.spaces.get(space)?.blobs.get(content).cloned()
    }

    /// The agent that provisioned `space`.
    pub async fn owner(&self, space: &Did) -> Option<Did> {
        let state = self.state.read().await;
        state.spaces.get(space)?.owner.clone()
    }

    fn check_reachable(state: &ServiceState) -> Result<(), ServiceError> {
        if state.unreachable {
            return Err(ServiceError::Unreachable("memory service is offline".into()));
        }
        Ok(())
    }
}

fn space_mut<'a>(state: &'a mut ServiceState, space: &Did) -> Result<&'a mut SpaceState, ServiceError> {
    state
        .spaces
        .get_mut(space)
        .ok_or_else(|| ServiceError::NotFound(format!("space {space}")))
}

#[async_trait]
impl Service for MemoryService {
    async fn provision(&self, space: &Did, agent: &Did) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        Self::check_reachable(&state)?;

        let entry = state.spaces.entry(space.clone()).or_default();
        match &entry.owner {
            Some(owner) if owner != agent => Err(ServiceError::Rejected(format!(
                "space {space} is already provisioned by {owner}"
            ))),
            _ => {
                entry.owner = Some(agent.clone());
                Ok(())
            }
        }
    }

    async fn add_blob(
        &self,
        space: &Did,
        content: &ContentId,
        bytes: Vec<u8>,
        proof: &Delegation,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        Self::check_reachable(&state)?;
        check_proof(space, proof, Ability::BlobAdd)?;

        if state.verification_required {
            return Err(ServiceError::VerificationRequired(
                "please verify your email address before uploading".into(),
            ));
        }

        if ContentId::for_bytes(&bytes) != *content {
            return Err(ServiceError::Rejected(format!(
                "bytes do not hash to {content}"
            )));
        }

        space_mut(&mut state, space)?
            .blobs
            .insert(*content, bytes);
        Ok(())
    }

    async fn register_upload(
        &self,
        space: &Did,
        root: &ContentId,
        proof: &Delegation,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        Self::check_reachable(&state)?;
        check_proof(space, proof, Ability::UploadAdd)?;

        let entry = space_mut(&mut state, space)?;
        if !entry.blobs.contains_key(root) {
            return Err(ServiceError::Rejected(format!("blob {root} is not stored")));
        }
        if !entry.uploads.contains(root) {
            entry.uploads.push(*root);
        }
        Ok(())
    }

    async fn uploads(&self, space: &Did) -> Result<Vec<ContentId>, ServiceError> {
        let state = self.state.read().await;
        Self::check_reachable(&state)?;

        state
            .spaces
            .get(space)
            .map(|entry| entry.uploads.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("space {space}")))
    }
}
