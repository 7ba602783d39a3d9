use crate::TransactionHash;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when parsing an [`Address`](crate::Address).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The `0x` prefix is missing.
    #[error("address '{0}' is missing the 0x prefix")]
    MissingPrefix(String),

    /// The address does not have 40 hex digits.
    #[error("address '{input}' has {length} hex digits, expected 40")]
    InvalidLength {
        /// The rejected input.
        input: String,
        /// Number of digits found.
        length: usize,
    },

    /// The address contains non-hex characters.
    #[error("address '{0}' is not valid hex")]
    InvalidHex(String),
}

/// Errors reported by a [`Ledger`](crate::Ledger) backend.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// The ledger could not be reached.
    #[error("Ledger unreachable: {0}")]
    Unreachable(String),

    /// The ledger refused the state change.
    #[error("Ledger rejected transaction: {0}")]
    Rejected(String),

    /// The ledger answered with something that could not be interpreted.
    #[error("Unexpected ledger response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by the [`AuthorizationGate`](crate::AuthorizationGate).
#[derive(Debug, Clone, Error)]
pub enum AuthorizationError {
    /// The principal is not a valid account address.
    #[error("Malformed principal: {0}")]
    MalformedPrincipal(#[from] AddressError),

    /// The ledger could not be queried.
    #[error("Ledger unreachable: {0}")]
    LedgerUnreachable(String),

    /// The ledger refused the state change.
    #[error("Transaction rejected: {reason}")]
    TransactionRejected {
        /// The transaction, when it made it onto the ledger.
        transaction: Option<TransactionHash>,
        /// Why the ledger refused it.
        reason: String,
    },

    /// The transaction was not confirmed in time.
    #[error("Transaction {transaction} not confirmed after {waited:?}")]
    ConfirmationTimeout {
        /// The pending transaction.
        transaction: TransactionHash,
        /// How long we waited.
        waited: Duration,
    },
}

impl From<LedgerError> for AuthorizationError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::Unreachable(reason) => AuthorizationError::LedgerUnreachable(reason),
            LedgerError::InvalidResponse(reason) => AuthorizationError::LedgerUnreachable(reason),
            LedgerError::Rejected(reason) => AuthorizationError::TransactionRejected {
                transaction: None,
                reason,
            },
        }
    }
}
