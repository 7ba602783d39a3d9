use crate::PipelineError;
use std::path::PathBuf;
use vault_capability::{Abilities, Delegation};
use vault_storage::{ContentId, SpaceId, StorageError, StorageNetwork};

/// Where the bytes of an upload come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Content already in memory.
    Bytes(Vec<u8>),
    /// A file on the local filesystem.
    File(PathBuf),
}

impl UploadSource {
    /// Read the whole content.
    pub async fn read(self) -> Result<Vec<u8>, PipelineError> {
        match self {
            UploadSource::Bytes(bytes) => Ok(bytes),
            UploadSource::File(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(bytes),
                Err(source) => Err(PipelineError::FileRead {
                    path: Some(path),
                    source,
                }),
            },
        }
    }
}

impl From<Vec<u8>> for UploadSource {
    fn from(bytes: Vec<u8>) -> Self {
        UploadSource::Bytes(bytes)
    }
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        UploadSource::File(path)
    }
}

/// Check that `delegation` lets its holder upload into `space`.
pub fn check_delegation(space: &SpaceId, delegation: &Delegation) -> Result<(), PipelineError> {
    delegation
        .verify()
        .map_err(|error| PipelineError::InvalidDelegation(error.to_string()))?;

    if delegation.issuer() != space {
        return Err(PipelineError::InvalidDelegation(format!(
            "issued by {}, not by space {}",
            delegation.issuer(),
            space
        )));
    }

    if !delegation.abilities().covers(&Abilities::upload()) {
        return Err(PipelineError::InvalidDelegation(format!(
            "grants {}, uploads need {}",
            delegation.abilities(),
            Abilities::upload()
        )));
    }

    Ok(())
}

/// Upload `source` into `space`, using `delegation` as proof.
///
/// `space` is selected as the current space first. The delegation is checked
/// before any content is read, and nothing is retried.
pub async fn upload<N>(
    network: &N,
    source: UploadSource,
    space: &SpaceId,
    delegation: &Delegation,
) -> Result<ContentId, PipelineError>
where
    N: StorageNetwork + ?Sized,
{
    if network.current_space().await.as_ref() != Some(space) {
        network
            .set_current_space(space)
            .await
            .map_err(PipelineError::SpaceProvisioning)?;
    }

    check_delegation(space, delegation)?;

    let content = source.read().await?;
    let expected = ContentId::for_bytes(&content);
    let size = content.len();
    tracing::debug!(%space, content = %expected, size, "uploading");

    let stored = network
        .upload_bytes(content, delegation)
        .await
        .map_err(|error| match error {
            error if error.is_verification_required() => PipelineError::VerificationRequired(error),
            StorageError::NoCurrentSpace => PipelineError::NoActiveSpace {
                expected: space.clone(),
                current: None,
            },
            error => PipelineError::UploadTransport(error),
        })?;

    if stored != expected {
        return Err(PipelineError::UploadTransport(StorageError::Service(
            vault_storage::ServiceError::Rejected(format!(
                "network stored {stored}, expected {expected}"
            )),
        )));
    }

    Ok(stored)
}
