use thiserror::Error;
use vault_capability::{DelegationError, Did, KeyError};

/// Errors reported by a remote [`Service`](crate::Service).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The account behind the agent has not completed email verification.
    #[error("Account verification required: {0}")]
    VerificationRequired(String),

    /// The proof did not authorize the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The space (or content) is unknown to the service.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The service refused the request.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The service could not be reached.
    #[error("Service unreachable: {0}")]
    Unreachable(String),
}

/// Errors that can occur when parsing a [`ContentId`](crate::ContentId).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentIdError {
    /// The input is not a CID.
    #[error("'{0}' is not a valid CID")]
    Invalid(String),

    /// The CID does not address raw bytes.
    #[error("CID '{cid}' has codec 0x{codec:x}, expected raw (0x55)")]
    UnexpectedCodec {
        /// The rejected CID.
        cid: String,
        /// Its codec.
        codec: u64,
    },
}

/// Errors surfaced by the storage network [`Client`](crate::Client).
#[derive(Debug, Error)]
pub enum StorageError {
    /// A space key could not be generated.
    #[error("Failed to generate space key: {0}")]
    Key(#[from] KeyError),

    /// A delegation could not be created.
    #[error("Delegation failed: {0}")]
    Delegation(#[from] DelegationError),

    /// No space has been selected yet.
    #[error("No current space is set")]
    NoCurrentSpace,

    /// The space is not known to this client.
    #[error("Space {0} is not known to this client")]
    SpaceNotFound(Did),

    /// The remote service reported an error.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl StorageError {
    /// Whether the failure means the account still has to be verified.
    pub fn is_verification_required(&self) -> bool {
        matches!(
            self,
            StorageError::Service(ServiceError::VerificationRequired(_))
        )
    }
}
