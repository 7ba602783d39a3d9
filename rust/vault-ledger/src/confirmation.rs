use crate::{AuthorizationError, Ledger, Receipt, ReceiptStatus, TransactionHash};
use std::time::Duration;

/// How long to wait for a submitted transaction to become final, and how
/// often to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Give up after this long.
    pub timeout: Duration,
    /// Delay between receipt lookups.
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl ConfirmationPolicy {
    /// Set the overall timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// A transaction that has been submitted but not yet observed as final.
///
/// Dropping it abandons the wait, not the transaction.
#[derive(Debug)]
pub struct PendingTransaction<'a, L: Ledger + ?Sized> {
    ledger: &'a L,
    transaction: TransactionHash,
}

impl<'a, L: Ledger + ?Sized> PendingTransaction<'a, L> {
    /// Track `transaction` on `ledger`.
    pub fn new(ledger: &'a L, transaction: TransactionHash) -> Self {
        Self {
            ledger,
            transaction,
        }
    }

    /// The hash of the pending transaction.
    pub fn transaction(&self) -> &TransactionHash {
        &self.transaction
    }

    /// Poll for the receipt until it shows up or `policy.timeout` elapses.
    ///
    /// A reverted receipt is reported as
    /// [`AuthorizationError::TransactionRejected`].
    pub async fn confirm(self, policy: &ConfirmationPolicy) -> Result<Receipt, AuthorizationError> {
        let transaction = self.transaction;
        let wait = async {
            loop {
                match self.ledger.receipt(&transaction).await {
                    Ok(Some(receipt)) => return Ok(receipt),
                    Ok(None) => tokio::time::sleep(policy.poll_interval).await,
                    Err(error) => return Err(AuthorizationError::from(error)),
                }
            }
        };

        let receipt = tokio::time::timeout(policy.timeout, wait)
            .await
            .map_err(|_| AuthorizationError::ConfirmationTimeout {
                transaction,
                waited: policy.timeout,
            })??;

        match receipt.status {
            ReceiptStatus::Success => {
                tracing::debug!(%transaction, block = receipt.block_number, "transaction confirmed");
                Ok(receipt)
            }
            ReceiptStatus::Reverted => Err(AuthorizationError::TransactionRejected {
                transaction: Some(transaction),
                reason: "transaction reverted".to_string(),
            }),
        }
    }
}
