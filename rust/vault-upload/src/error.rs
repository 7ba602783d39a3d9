use std::path::PathBuf;
use thiserror::Error;
use vault_ledger::{AddressError, AuthorizationError};
use vault_storage::{SpaceId, StorageError};

/// Message shown to a user whose account still needs email verification.
pub const VERIFICATION_MESSAGE: &str =
    "Please check your email and click the verification link, then try again.";

/// Message shown for every other upload failure.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed.";

/// Errors surfaced by the upload pipeline.
///
/// Each step reports its own variants and they propagate unchanged; callers
/// that present errors to users should go through
/// [`PipelineError::user_message`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The principal is not a valid account address.
    #[error("Malformed principal: {0}")]
    MalformedPrincipal(AddressError),

    /// The ledger could not be queried.
    #[error("Ledger unreachable: {0}")]
    LedgerUnreachable(String),

    /// The ledger refused a state change.
    #[error(transparent)]
    TransactionRejected(AuthorizationError),

    /// A ledger transaction was not confirmed in time.
    #[error(transparent)]
    ConfirmationTimeout(AuthorizationError),

    /// The account is not authorized to upload.
    #[error("Account {account} is not authorized")]
    Unauthorized {
        /// The account that was checked.
        account: String,
    },

    /// No space could be listed, created or selected.
    #[error("Space provisioning failed: {0}")]
    SpaceProvisioning(#[source] StorageError),

    /// The client's current space is missing or not the expected one.
    #[error("No active space {expected} (current: {current:?})")]
    NoActiveSpace {
        /// The space the operation was asked to use.
        expected: SpaceId,
        /// The client's current space.
        current: Option<SpaceId>,
    },

    /// The space identity could not sign the delegation.
    #[error("Delegation signing failed: {0}")]
    DelegationSigning(#[source] StorageError),

    /// The delegation does not authorize the upload.
    #[error("Invalid delegation: {0}")]
    InvalidDelegation(String),

    /// The content could not be read.
    #[error("Failed to read upload content: {source}")]
    FileRead {
        /// The file, when reading from the filesystem.
        path: Option<PathBuf>,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The account must complete email verification before uploading.
    #[error("Account verification required: {0}")]
    VerificationRequired(#[source] StorageError),

    /// The transfer to the storage network failed.
    #[error("Upload failed: {0}")]
    UploadTransport(#[source] StorageError),
}

impl PipelineError {
    /// Whether the failure is the account/email verification condition.
    pub fn is_verification_required(&self) -> bool {
        matches!(self, PipelineError::VerificationRequired(_))
    }

    /// The message to show an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::VerificationRequired(_) => VERIFICATION_MESSAGE,
            PipelineError::Unauthorized { .. } => "This account is not authorized to upload.",
            PipelineError::MalformedPrincipal(_) => "Invalid account address.",
            _ => UPLOAD_FAILED_MESSAGE,
        }
    }
}

impl From<AuthorizationError> for PipelineError {
    fn from(error: AuthorizationError) -> Self {
        match error {
            AuthorizationError::MalformedPrincipal(error) => PipelineError::MalformedPrincipal(error),
            AuthorizationError::LedgerUnreachable(reason) => {
                PipelineError::LedgerUnreachable(reason)
            }
            error @ AuthorizationError::TransactionRejected { .. } => {
                PipelineError::TransactionRejected(error)
            }
            error @ AuthorizationError::ConfirmationTimeout { .. } => {
                PipelineError::ConfirmationTimeout(error)
            }
        }
    }
}
