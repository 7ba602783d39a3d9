//! Ledger-backed authorization for the upload vault.
//!
//! Access to the vault is recorded in an access-control contract exposing
//! three functions:
//!
//! - `isAuthorized(address) -> bool` (read only)
//! - `grantAccess(address)` (state changing)
//! - `revokeAccess(address)` (state changing)
//!
//! The [`Ledger`] trait is the boundary to that contract. Reads are a single
//! round trip; writes are two-phase: [`Ledger::submit`] returns a
//! [`TransactionHash`] and the caller polls [`Ledger::receipt`] until the
//! transaction is final (see [`PendingTransaction`]).
//!
//! [`AuthorizationGate`] composes the two into the operations the upload
//! pipeline needs, re-reading the ledger on every call.
//!
//! Two ledgers are provided:
//!
//! - [`MemoryLedger`], an in-process emulation of the contract.
//! - [`JsonRpcLedger`], an Ethereum JSON-RPC client.

mod error;
pub use error::*;

mod address;
pub use address::*;

mod ledger;
pub use ledger::*;

mod confirmation;
pub use confirmation::*;

mod gate;
pub use gate::*;

mod memory;
pub use memory::*;

pub mod abi;

mod rpc;
pub use rpc::*;
