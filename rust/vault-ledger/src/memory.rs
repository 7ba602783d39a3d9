//! In-memory access-control contract for tests and local development.

use crate::{AccessCall, Address, Ledger, LedgerError, Receipt, ReceiptStatus, TransactionHash};
use async_trait::async_trait;
use sha3::{Digest, Keccak256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An event emitted by the contract when a transaction is mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEvent {
    /// `AccessGranted(user)`
    Granted(Address),
    /// `AccessRevoked(user)`
    Revoked(Address),
}

#[derive(Debug)]
struct Pending {
    call: AccessCall,
    polls_remaining: u32,
}

#[derive(Debug, Default)]
struct LedgerState {
    unreachable: bool,
    authorized: HashSet<Address>,
    pending: HashMap<TransactionHash, Pending>,
    receipts: HashMap<TransactionHash, Receipt>,
    events: Vec<AccessEvent>,
    block_number: u64,
    nonce: u64,
}

/// In-memory emulation of the access-control contract.
///
/// Transactions are mined lazily: a submitted call stays pending for the
/// configured number of receipt lookups, then its effect is applied and a
/// receipt appears. Clones share the same state.
///
/// # Examples
///
/// ```
/// use vault_ledger::{AuthorizationGate, MemoryLedger};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ledger = MemoryLedger::new();
/// let gate = AuthorizationGate::new(ledger.clone());
///
/// let account = "0x0000000000000000000000000000000000000abc";
/// assert!(!gate.check_authorized(account).await?);
///
/// gate.request_authorization(account).await?;
/// assert!(gate.check_authorized(account).await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    owner: Option<Address>,
    sender: Address,
    confirmations: u32,
    state: Arc<RwLock<LedgerState>>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    /// An open contract: anyone may grant or revoke, each transaction needs
    /// one receipt lookup before it is mined.
    pub fn new() -> Self {
        Self {
            owner: None,
            sender: Address::ZERO,
            confirmations: 1,
            state: Arc::new(RwLock::new(LedgerState::default())),
        }
    }

    /// Only `owner` may submit state changes.
    pub fn with_owner(mut self, owner: Address) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Submit transactions as `sender`.
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = sender;
        self
    }

    /// Number of pending receipt lookups before a transaction is mined.
    pub fn with_confirmations(mut self, confirmations: u32) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Simulate the ledger going offline (or coming back).
    pub async fn set_reachable(&self, reachable: bool) {
        self.state.write().await.unreachable = !reachable;
    }

    /// Change an account's access directly, as another party would.
    pub async fn set_authorized(&self, account: Address, authorized: bool) {
        let mut state = self.state.write().await;
        if authorized {
            state.authorized.insert(account);
        } else {
            state.authorized.remove(&account);
        }
    }

    /// Events emitted so far, oldest first.
    pub async fn events(&self) -> Vec<AccessEvent> {
        self.state.read().await.events.clone()
    }

    fn check_reachable(state: &LedgerState) -> Result<(), LedgerError> {
        if state.unreachable {
            return Err(LedgerError::Unreachable("memory ledger is offline".into()));
        }
        Ok(())
    }

    fn mine(state: &mut LedgerState, transaction: TransactionHash, call: AccessCall) -> Receipt {
        state.block_number += 1;
        match call {
            AccessCall::Grant(account) => {
                state.authorized.insert(account);
                state.events.push(AccessEvent::Granted(account));
            }
            AccessCall::Revoke(account) => {
                state.authorized.remove(&account);
                state.events.push(AccessEvent::Revoked(account));
            }
        }
        let receipt = Receipt {
            transaction,
            block_number: state.block_number,
            status: ReceiptStatus::Success,
        };
        state.receipts.insert(transaction, receipt.clone());
        receipt
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn is_authorized(&self, account: &Address) -> Result<bool, LedgerError> {
        let state = self.state.read().await;
        Self::check_reachable(&state)?;
        Ok(state.authorized.contains(account))
    }

    async fn submit(&self, call: AccessCall) -> Result<TransactionHash, LedgerError> {
        let mut state = self.state.write().await;
        Self::check_reachable(&state)?;

        if let Some(owner) = self.owner {
            if owner != self.sender {
                return Err(LedgerError::Rejected(format!(
                    "{} is not the contract owner",
                    self.sender
                )));
            }
        }

        state.nonce += 1;
        let mut hasher = Keccak256::new();
        hasher.update(self.sender.as_bytes());
        hasher.update(call.signature().as_bytes());
        hasher.update(call.account().as_bytes());
        hasher.update(state.nonce.to_be_bytes());
        let transaction = TransactionHash::new(hasher.finalize().into());

        state.pending.insert(
            transaction,
            Pending {
                call,
                polls_remaining: self.confirmations,
            },
        );
        Ok(transaction)
    }

    async fn receipt(&self, transaction: &TransactionHash) -> Result<Option<Receipt>, LedgerError> {
        let mut state = self.state.write().await;
        Self::check_reachable(&state)?;

        if let Some(receipt) = state.receipts.get(transaction) {
            return Ok(Some(receipt.clone()));
        }

        let Some(pending) = state.pending.get_mut(transaction) else {
            return Ok(None);
        };

        if pending.polls_remaining > 0 {
            pending.polls_remaining -= 1;
            return Ok(None);
        }

        let call = pending.call;
        state.pending.remove(transaction);
        Ok(Some(Self::mine(&mut state, *transaction, call)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::new(bytes)
    }

    #[tokio::test]
    async fn transactions_stay_pending_for_the_configured_polls() -> anyhow::Result<()> {
        let ledger = MemoryLedger::new().with_confirmations(2);
        let transaction = ledger.submit(AccessCall::Grant(account(1))).await?;

        assert_eq!(ledger.receipt(&transaction).await?, None);
        assert_eq!(ledger.receipt(&transaction).await?, None);
        assert!(!ledger.is_authorized(&account(1)).await?);

        let receipt = ledger.receipt(&transaction).await?.expect("mined");
        assert_eq!(receipt.status, ReceiptStatus::Success);
        assert_eq!(receipt.block_number, 1);
        assert!(ledger.is_authorized(&account(1)).await?);

        assert_eq!(ledger.receipt(&transaction).await?, Some(receipt));
        Ok(())
    }

    #[tokio::test]
    async fn transaction_hashes_are_unique() -> anyhow::Result<()> {
        let ledger = MemoryLedger::new();
        let first = ledger.submit(AccessCall::Grant(account(1))).await?;
        let second = ledger.submit(AccessCall::Grant(account(1))).await?;
        assert_ne!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_transactions_have_no_receipt() -> anyhow::Result<()> {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.receipt(&TransactionHash::new([7; 32])).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn the_owner_may_submit() -> anyhow::Result<()> {
        let ledger = MemoryLedger::new()
            .with_owner(account(9))
            .with_sender(account(9))
            .with_confirmations(0);
        let transaction = ledger.submit(AccessCall::Grant(account(1))).await?;
        assert!(ledger.receipt(&transaction).await?.is_some());
        assert_eq!(ledger.events().await, vec![AccessEvent::Granted(account(1))]);
        Ok(())
    }
}
