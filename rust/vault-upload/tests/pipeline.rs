use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use vault_capability::{
    Abilities, Ability, Delegation, DelegationError, Did, Ed25519Signer, Principal, SignError,
};
use vault_ledger::{AuthorizationGate, Confirmation, ConfirmationPolicy, MemoryLedger};
use vault_storage::{
    Client, ContentId, MemoryService, Service, SpaceId, SpaceInfo, StorageError, StorageNetwork,
};
use vault_upload::{
    Pipeline, PipelineError, SpaceManager, UPLOAD_FAILED_MESSAGE, UploadRequest, UploadSource,
    VERIFICATION_MESSAGE, issue_delegation,
};

const ACCOUNT: &str = "0x4ac093e5c35a9b7cd0b59a15bf4e6cf5710ca74d";

/// A storage session that counts delegation requests and can lose its
/// signing keys.
struct Recording<N> {
    inner: N,
    delegations: AtomicUsize,
    signer_unavailable: bool,
}

impl<N> Recording<N> {
    fn new(inner: N) -> Self {
        Self {
            inner,
            delegations: AtomicUsize::new(0),
            signer_unavailable: false,
        }
    }

    fn delegations(&self) -> usize {
        self.delegations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<N: StorageNetwork> StorageNetwork for Recording<N> {
    fn agent(&self) -> Did {
        self.inner.agent()
    }

    async fn list_spaces(&self) -> Result<Vec<SpaceInfo>, StorageError> {
        self.inner.list_spaces().await
    }

    async fn create_space(&self, name: &str) -> Result<SpaceInfo, StorageError> {
        self.inner.create_space(name).await
    }

    async fn set_current_space(&self, space: &SpaceId) -> Result<(), StorageError> {
        self.inner.set_current_space(space).await
    }

    async fn current_space(&self) -> Option<SpaceId> {
        self.inner.current_space().await
    }

    async fn create_delegation(
        &self,
        audience: &Did,
        abilities: Abilities,
    ) -> Result<Delegation, StorageError> {
        self.delegations.fetch_add(1, Ordering::SeqCst);
        if self.signer_unavailable {
            return Err(StorageError::Delegation(DelegationError::Signing(
                SignError::KeyUnavailable("space key is locked".into()),
            )));
        }
        self.inner.create_delegation(audience, abilities).await
    }

    async fn upload_bytes(
        &self,
        content: Vec<u8>,
        proof: &Delegation,
    ) -> Result<ContentId, StorageError> {
        self.inner.upload_bytes(content, proof).await
    }
}

type Session = Arc<Recording<Client<MemoryService>>>;

struct Harness {
    ledger: MemoryLedger,
    service: MemoryService,
    session: Session,
    pipeline: Pipeline<MemoryLedger, Session>,
}

fn harness() -> anyhow::Result<Harness> {
    let ledger = MemoryLedger::new();
    let service = MemoryService::new();
    let client = Client::new(Ed25519Signer::import(&[1; 32])?, service.clone());
    let session = Arc::new(Recording::new(client));

    let gate = AuthorizationGate::new(ledger.clone()).with_confirmation(
        ConfirmationPolicy::default()
            .with_timeout(Duration::from_secs(5))
            .with_poll_interval(Duration::from_millis(1)),
    );
    let pipeline = Pipeline::new(gate, session.clone());

    Ok(Harness {
        ledger,
        service,
        session,
        pipeline,
    })
}

fn request(account: &str, content: &[u8]) -> anyhow::Result<UploadRequest> {
    Ok(UploadRequest {
        account: account.to_string(),
        agent: Ed25519Signer::import(&[2; 32])?.did(),
        source: UploadSource::Bytes(content.to_vec()),
    })
}

#[tokio::test]
async fn first_use_creates_a_single_default_space() -> anyhow::Result<()> {
    let Harness { session, .. } = harness()?;
    let manager = SpaceManager::default();

    let first = manager.ensure_active_space(session.as_ref()).await?;
    let second = manager.ensure_active_space(session.as_ref()).await?;

    assert_eq!(first, second);
    let spaces = session.list_spaces().await?;
    assert_eq!(spaces.len(), 1);
    assert_eq!(spaces[0].name, "MySpace");
    Ok(())
}

#[tokio::test]
async fn unauthorized_accounts_never_reach_the_issuer() -> anyhow::Result<()> {
    let Harness {
        session, pipeline, ..
    } = harness()?;

    assert!(!pipeline.is_authorized(ACCOUNT).await?);
    let result = pipeline.run(request(ACCOUNT, b"hello")?).await;

    assert!(matches!(result, Err(PipelineError::Unauthorized { .. })));
    assert_eq!(session.delegations(), 0);
    assert!(session.list_spaces().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn short_principals_are_malformed_and_halt_the_pipeline() -> anyhow::Result<()> {
    let Harness {
        session, pipeline, ..
    } = harness()?;

    let result = pipeline.run(request("0xABC", b"hello")?).await;

    assert!(matches!(result, Err(PipelineError::MalformedPrincipal(_))));
    assert_eq!(session.delegations(), 0);
    Ok(())
}

#[tokio::test]
async fn authorized_uploads_are_content_addressed() -> anyhow::Result<()> {
    let Harness {
        service,
        session,
        pipeline,
        ..
    } = harness()?;

    let confirmation = pipeline.request_access(ACCOUNT).await?;
    assert!(matches!(confirmation, Confirmation::Confirmed(_)));

    let first = pipeline.run(request(ACCOUNT, b"hello")?).await?;
    let second = pipeline.run(request(ACCOUNT, b"hello")?).await?;

    assert_eq!(first.content_id, ContentId::for_bytes(b"hello"));
    assert_eq!(first.content_id, second.content_id);
    assert_eq!(first.space, second.space);
    assert_ne!(first.delegation, second.delegation);
    assert_eq!(session.delegations(), 2);
    assert_eq!(
        service.uploads(&first.space).await?,
        vec![first.content_id]
    );
    Ok(())
}

#[tokio::test]
async fn becoming_authorized_lets_the_same_request_through() -> anyhow::Result<()> {
    let Harness {
        ledger, pipeline, ..
    } = harness()?;

    let refused = pipeline.run(request(ACCOUNT, b"hello")?).await;
    assert!(matches!(refused, Err(PipelineError::Unauthorized { .. })));

    ledger.set_authorized(ACCOUNT.parse()?, true).await;
    let receipt = pipeline.run(request(ACCOUNT, b"hello")?).await?;

    assert_eq!(receipt.content_id, ContentId::for_bytes(b"hello"));
    assert!(ledger.events().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn requesting_access_twice_submits_once() -> anyhow::Result<()> {
    let Harness {
        ledger, pipeline, ..
    } = harness()?;

    pipeline.request_access(ACCOUNT).await?;
    let second = pipeline.request_access(ACCOUNT).await?;

    assert_eq!(second, Confirmation::Unchanged);
    assert_eq!(ledger.events().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn verification_failures_are_distinguished() -> anyhow::Result<()> {
    let Harness {
        ledger,
        service,
        pipeline,
        ..
    } = harness()?;
    ledger.set_authorized(ACCOUNT.parse()?, true).await;

    service.set_verification_required(true).await;
    let error = pipeline
        .run(request(ACCOUNT, b"hello")?)
        .await
        .expect_err("unverified accounts cannot upload");
    assert!(error.is_verification_required());
    assert_eq!(error.user_message(), VERIFICATION_MESSAGE);

    service.set_verification_required(false).await;
    service.set_reachable(false).await;
    let error = pipeline
        .run(request(ACCOUNT, b"hello")?)
        .await
        .expect_err("offline services cannot store content");
    assert!(!error.is_verification_required());
    assert_eq!(error.user_message(), UPLOAD_FAILED_MESSAGE);
    Ok(())
}

#[tokio::test]
async fn unreachable_ledgers_halt_the_pipeline() -> anyhow::Result<()> {
    let Harness {
        ledger,
        session,
        pipeline,
        ..
    } = harness()?;
    ledger.set_reachable(false).await;

    let result = pipeline.run(request(ACCOUNT, b"hello")?).await;

    assert!(matches!(result, Err(PipelineError::LedgerUnreachable(_))));
    assert_eq!(session.delegations(), 0);
    Ok(())
}

#[tokio::test]
async fn signing_failures_are_reported_as_such() -> anyhow::Result<()> {
    let client = Client::new(Ed25519Signer::import(&[1; 32])?, MemoryService::new());
    let mut session = Recording::new(client);
    session.signer_unavailable = true;

    let space = SpaceManager::default().ensure_active_space(&session).await?;
    let audience = Ed25519Signer::import(&[2; 32])?.did();
    let result = issue_delegation(&session, &space, &audience).await;

    assert!(matches!(result, Err(PipelineError::DelegationSigning(_))));
    Ok(())
}

#[tokio::test]
async fn delegations_carry_exactly_the_upload_abilities() -> anyhow::Result<()> {
    let Harness { session, .. } = harness()?;
    let space = SpaceManager::default()
        .ensure_active_space(session.as_ref())
        .await?;

    for seed in 2..6u8 {
        let audience = Ed25519Signer::import(&[seed; 32])?.did();
        let delegation = issue_delegation(session.as_ref(), &space, &audience).await?;

        assert_eq!(delegation.abilities(), &Abilities::upload());
        assert_eq!(
            delegation.abilities().iter().collect::<Vec<_>>(),
            vec![Ability::BlobAdd, Ability::UploadAdd]
        );
    }
    Ok(())
}
