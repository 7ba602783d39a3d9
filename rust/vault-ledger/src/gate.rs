use crate::{
    AccessCall, Address, AuthorizationError, ConfirmationPolicy, Ledger, PendingTransaction,
    Receipt,
};

/// Result of asking the gate to change an account's access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// The account was already in the requested state; nothing was submitted.
    Unchanged,
    /// A transaction was submitted and confirmed.
    Confirmed(Receipt),
}

/// Checks and changes on-chain authorization for account principals.
///
/// The gate never caches: every check is a fresh read, since access can be
/// granted or revoked out of band between requests.
#[derive(Debug, Clone)]
pub struct AuthorizationGate<L> {
    ledger: L,
    confirmation: ConfirmationPolicy,
}

impl<L: Ledger> AuthorizationGate<L> {
    /// Create a gate over `ledger` with the default [`ConfirmationPolicy`].
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            confirmation: ConfirmationPolicy::default(),
        }
    }

    /// Use `policy` when waiting for transactions.
    pub fn with_confirmation(mut self, policy: ConfirmationPolicy) -> Self {
        self.confirmation = policy;
        self
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Whether `principal` is currently authorized.
    pub async fn check_authorized(&self, principal: &str) -> Result<bool, AuthorizationError> {
        let account: Address = principal.parse()?;
        let authorized = self.ledger.is_authorized(&account).await?;
        tracing::debug!(%account, authorized, "checked authorization");
        Ok(authorized)
    }

    /// Submit `grantAccess(principal)` and wait for it to be confirmed.
    ///
    /// Already authorized accounts get [`Confirmation::Unchanged`] without a
    /// transaction being sent.
    pub async fn request_authorization(
        &self,
        principal: &str,
    ) -> Result<Confirmation, AuthorizationError> {
        let account: Address = principal.parse()?;
        if self.ledger.is_authorized(&account).await? {
            tracing::debug!(%account, "already authorized");
            return Ok(Confirmation::Unchanged);
        }
        self.execute(AccessCall::Grant(account)).await
    }

    /// Submit `revokeAccess(principal)` and wait for it to be confirmed.
    ///
    /// Accounts without access get [`Confirmation::Unchanged`].
    pub async fn revoke_authorization(
        &self,
        principal: &str,
    ) -> Result<Confirmation, AuthorizationError> {
        let account: Address = principal.parse()?;
        if !self.ledger.is_authorized(&account).await? {
            tracing::debug!(%account, "not authorized, nothing to revoke");
            return Ok(Confirmation::Unchanged);
        }
        self.execute(AccessCall::Revoke(account)).await
    }

    async fn execute(&self, call: AccessCall) -> Result<Confirmation, AuthorizationError> {
        let transaction = self.ledger.submit(call).await?;
        tracing::info!(
            account = %call.account(),
            function = call.signature(),
            %transaction,
            "submitted access transaction"
        );

        let receipt = PendingTransaction::new(&self.ledger, transaction)
            .confirm(&self.confirmation)
            .await?;

        tracing::info!(
            account = %call.account(),
            %transaction,
            block = receipt.block_number,
            "access transaction confirmed"
        );
        Ok(Confirmation::Confirmed(receipt))
    }
}
