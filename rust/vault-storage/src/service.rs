//! The remote side of the storage network.
//!
//! A [`Service`] stores blobs inside spaces and keeps an index of uploads
//! per space. Every write carries a [`Delegation`] from the space as proof;
//! the service rejects writes whose proof does not grant the ability.

mod memory;
pub use memory::*;

mod rest;
pub use rest::*;

use crate::{ContentId, ServiceError};
use async_trait::async_trait;
use std::sync::Arc;
use vault_capability::{Ability, Delegation, Did};

/// Storage network endpoints used by the [`Client`](crate::Client).
#[async_trait]
pub trait Service: Send + Sync {
    /// Register `space` with the service, owned by `agent`.
    async fn provision(&self, space: &Did, agent: &Did) -> Result<(), ServiceError>;

    /// Store `bytes` under `content` in `space` (`space/blob/add`).
    async fn add_blob(
        &self,
        space: &Did,
        content: &ContentId,
        bytes: Vec<u8>,
        proof: &Delegation,
    ) -> Result<(), ServiceError>;

    /// Record `root` as an upload in `space` (`upload/add`).
    async fn register_upload(
        &self,
        space: &Did,
        root: &ContentId,
        proof: &Delegation,
    ) -> Result<(), ServiceError>;

    /// Uploads registered in `space`, oldest first.
    async fn uploads(&self, space: &Did) -> Result<Vec<ContentId>, ServiceError>;
}

#[async_trait]
impl<T: Service + ?Sized> Service for Arc<T> {
    async fn provision(&self, space: &Did, agent: &Did) -> Result<(), ServiceError> {
        (**self).provision(space, agent).await
    }

    async fn add_blob(
        &self,
        space: &Did,
        content: &ContentId,
        bytes: Vec<u8>,
        proof: &Delegation,
    ) -> Result<(), ServiceError> {
        (**self).add_blob(space, content, bytes, proof).await
    }

    async fn register_upload(
        &self,
        space: &Did,
        root: &ContentId,
        proof: &Delegation,
    ) -> Result<(), ServiceError> {
        (**self).register_upload(space, root, proof).await
    }

    async fn uploads(&self, space: &Did) -> Result<Vec<ContentId>, ServiceError> {
        (**self).uploads(space).await
    }
}

/// Check that `proof` lets its holder exercise `ability` on `space`.
pub fn check_proof(space: &Did, proof: &Delegation, ability: Ability) -> Result<(), ServiceError> {
    proof
        .verify()
        .map_err(|error| ServiceError::Unauthorized(error.to_string()))?;

    if proof.subject() != space {
        return Err(ServiceError::Unauthorized(format!(
            "delegation is for {}, not {}",
            proof.subject(),
            space
        )));
    }

    if !proof.allows(ability) {
        return Err(ServiceError::Unauthorized(format!(
            "delegation does not grant {ability}"
        )));
    }

    Ok(())
}
