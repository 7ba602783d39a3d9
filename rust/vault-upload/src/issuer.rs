use crate::PipelineError;
use vault_capability::{Abilities, Delegation, Did};
use vault_storage::{SpaceId, StorageError, StorageNetwork};

/// Delegate upload rights on `space` to `audience`.
///
/// The delegation always carries exactly [`Abilities::upload`], never more.
/// `space` must be the session's current space.
pub async fn issue_delegation<N>(
    network: &N,
    space: &SpaceId,
    audience: &Did,
) -> Result<Delegation, PipelineError>
where
    N: StorageNetwork + ?Sized,
{
    let current = network.current_space().await;
    if current.as_ref() != Some(space) {
        return Err(PipelineError::NoActiveSpace {
            expected: space.clone(),
            current,
        });
    }

    let delegation = network
        .create_delegation(audience, Abilities::upload())
        .await
        .map_err(|error| match error {
            StorageError::NoCurrentSpace => PipelineError::NoActiveSpace {
                expected: space.clone(),
                current: None,
            },
            error => PipelineError::DelegationSigning(error),
        })?;

    if delegation.abilities() != &Abilities::upload() {
        return Err(PipelineError::InvalidDelegation(format!(
            "expected {}, got {}",
            Abilities::upload(),
            delegation.abilities()
        )));
    }

    tracing::info!(%space, %audience, "issued upload delegation");
    Ok(delegation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpaceManager;
    use pretty_assertions::assert_eq;
    use vault_capability::{Ability, Ed25519Signer, Principal};
    use vault_storage::{Client, MemoryService};

    async fn session() -> anyhow::Result<(Client<MemoryService>, SpaceId)> {
        let client = Client::new(Ed25519Signer::import(&[1; 32])?, MemoryService::new());
        let space = SpaceManager::default().ensure_active_space(&client).await?;
        Ok((client, space))
    }

    #[tokio::test]
    async fn it_grants_exactly_the_upload_abilities() -> anyhow::Result<()> {
        let (client, space) = session().await?;
        let audience = Ed25519Signer::import(&[2; 32])?.did();

        let delegation = issue_delegation(&client, &space, &audience).await?;

        delegation.verify()?;
        assert_eq!(delegation.issuer(), &space);
        assert_eq!(delegation.audience(), &audience);
        assert_eq!(delegation.abilities().len(), 2);
        assert!(delegation.allows(Ability::BlobAdd));
        assert!(delegation.allows(Ability::UploadAdd));
        assert_eq!(delegation.expiration(), None);
        Ok(())
    }

    #[tokio::test]
    async fn it_requires_an_active_space() -> anyhow::Result<()> {
        let client = Client::new(Ed25519Signer::import(&[1; 32])?, MemoryService::new());
        let space = client.create_space("MySpace").await?;

        let result = issue_delegation(&client, &space.did, &client.agent()).await;

        assert!(matches!(
            result,
            Err(PipelineError::NoActiveSpace { current: None, .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn it_refuses_spaces_other_than_the_current_one() -> anyhow::Result<()> {
        let (client, current) = session().await?;
        let other = client.create_space("other").await?;

        let result = issue_delegation(&client, &other.did, &client.agent()).await;

        match result {
            Err(PipelineError::NoActiveSpace {
                expected,
                current: Some(actual),
            }) => {
                assert_eq!(expected, other.did);
                assert_eq!(actual, current);
            }
            unexpected => panic!("expected NoActiveSpace, got {unexpected:?}"),
        }
        Ok(())
    }
}
