use crate::{Address, LedgerError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// A state-changing call on the access-control contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessCall {
    /// `grantAccess(address)`
    Grant(Address),
    /// `revokeAccess(address)`
    Revoke(Address),
}

impl AccessCall {
    /// The Solidity signature of the contract function.
    pub const fn signature(&self) -> &'static str {
        match self {
            AccessCall::Grant(_) => "grantAccess(address)",
            AccessCall::Revoke(_) => "revokeAccess(address)",
        }
    }

    /// The account the call is about.
    pub const fn account(&self) -> &Address {
        match self {
            AccessCall::Grant(account) | AccessCall::Revoke(account) => account,
        }
    }
}

/// The 32 byte hash identifying a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionHash([u8; 32]);

impl TransactionHash {
    /// Construct a hash from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        TransactionHash(bytes)
    }
}

impl FromStr for TransactionHash {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| LedgerError::InvalidResponse(format!("invalid transaction hash '{s}'")))?;
        Ok(TransactionHash(bytes))
    }
}

impl TryFrom<String> for TransactionHash {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransactionHash> for String {
    fn from(hash: TransactionHash) -> Self {
        hash.to_string()
    }
}

impl Display for TransactionHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// The state change was applied.
    Success,
    /// The transaction was mined but reverted.
    Reverted,
}

/// Evidence that a transaction reached the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The transaction this receipt is for.
    pub transaction: TransactionHash,
    /// The block the transaction was included in.
    pub block_number: u64,
    /// Whether the transaction succeeded.
    pub status: ReceiptStatus,
}

/// The access-control contract, as seen from this process.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Read `isAuthorized(account)`.
    async fn is_authorized(&self, account: &Address) -> Result<bool, LedgerError>;

    /// Submit a state-changing call. Returns once the ledger has accepted the
    /// transaction for inclusion, not once it is final.
    async fn submit(&self, call: AccessCall) -> Result<TransactionHash, LedgerError>;

    /// Look up the receipt for a submitted transaction. `None` while the
    /// transaction is still pending.
    async fn receipt(&self, transaction: &TransactionHash) -> Result<Option<Receipt>, LedgerError>;
}

#[async_trait]
impl<T: Ledger + ?Sized> Ledger for Arc<T> {
    async fn is_authorized(&self, account: &Address) -> Result<bool, LedgerError> {
        (**self).is_authorized(account).await
    }

    async fn submit(&self, call: AccessCall) -> Result<TransactionHash, LedgerError> {
        (**self).submit(call).await
    }

    async fn receipt(&self, transaction: &TransactionHash) -> Result<Option<Receipt>, LedgerError> {
        (**self).receipt(transaction).await
    }
}
