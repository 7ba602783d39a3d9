use crate::{PipelineError, SpaceManager, UploadSource, issue_delegation, upload};
use ipld_core::cid::Cid;
use vault_capability::Did;
use vault_ledger::{AuthorizationGate, Confirmation, Ledger};
use vault_storage::{ContentId, SpaceId, StorageNetwork};

/// One gated upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// The on-chain account that must be authorized.
    pub account: String,
    /// The agent the upload capability is delegated to.
    pub agent: Did,
    /// The content to upload.
    pub source: UploadSource,
}

/// The outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Identifier of the stored content.
    pub content_id: ContentId,
    /// The space the content was stored in.
    pub space: SpaceId,
    /// CID of the delegation the upload was performed under.
    pub delegation: Cid,
}

/// Authorization gate, space manager, delegation issuer and upload, composed
/// in that order.
pub struct Pipeline<L, N> {
    gate: AuthorizationGate<L>,
    network: N,
    spaces: SpaceManager,
}

impl<L, N> Pipeline<L, N>
where
    L: Ledger,
    N: StorageNetwork,
{
    /// Compose a pipeline that creates spaces with the default name.
    pub fn new(gate: AuthorizationGate<L>, network: N) -> Self {
        Self {
            gate,
            network,
            spaces: SpaceManager::default(),
        }
    }

    /// Use `spaces` to provision the working space.
    pub fn with_space_manager(mut self, spaces: SpaceManager) -> Self {
        self.spaces = spaces;
        self
    }

    /// The authorization gate.
    pub fn gate(&self) -> &AuthorizationGate<L> {
        &self.gate
    }

    /// The storage session.
    pub fn network(&self) -> &N {
        &self.network
    }

    /// Whether `account` may upload right now.
    pub async fn is_authorized(&self, account: &str) -> Result<bool, PipelineError> {
        Ok(self.gate.check_authorized(account).await?)
    }

    /// Grant `account` upload access on the ledger and wait for it to land.
    pub async fn request_access(&self, account: &str) -> Result<Confirmation, PipelineError> {
        Ok(self.gate.request_authorization(account).await?)
    }

    /// Run a gated upload end to end.
    ///
    /// Unauthorized accounts are turned away before any space is touched or
    /// any delegation is minted.
    pub async fn run(&self, request: UploadRequest) -> Result<UploadReceipt, PipelineError> {
        let UploadRequest {
            account,
            agent,
            source,
        } = request;

        if !self.gate.check_authorized(&account).await? {
            tracing::warn!(%account, "upload refused, account is not authorized");
            return Err(PipelineError::Unauthorized { account });
        }

        let space = self.spaces.ensure_active_space(&self.network).await?;
        let delegation = issue_delegation(&self.network, &space, &agent).await?;
        let delegation_cid = delegation
            .to_cid()
            .map_err(|error| PipelineError::InvalidDelegation(error.to_string()))?;

        let content_id = upload(&self.network, source, &space, &delegation).await?;

        tracing::info!(
            %account,
            %agent,
            %space,
            content = %content_id,
            delegation = %delegation_cid,
            "upload complete"
        );

        Ok(UploadReceipt {
            content_id,
            space,
            delegation: delegation_cid,
        })
    }
}
