//! The capability-gated upload pipeline.
//!
//! An upload passes four steps, strictly in order:
//!
//! 1. the [`AuthorizationGate`](vault_ledger::AuthorizationGate) confirms the
//!    account is allowed on the ledger,
//! 2. the [`SpaceManager`] makes sure the storage session has a current space,
//! 3. [`issue_delegation`] mints a delegation of exactly the upload abilities
//!    on that space to the requesting agent,
//! 4. [`upload`] checks the delegation and stores the content with it as
//!    proof, returning the content identifier.
//!
//! [`Pipeline`] composes the four. Any failure stops the run; nothing is
//! retried.
//!
//! # Example
//!
//! ```
//! use vault_capability::{Ed25519Signer, Principal};
//! use vault_ledger::{AuthorizationGate, MemoryLedger};
//! use vault_storage::{Client, MemoryService};
//! use vault_upload::{Pipeline, UploadRequest, UploadSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = MemoryLedger::new();
//! let client = Client::new(Ed25519Signer::generate()?, MemoryService::new());
//! let pipeline = Pipeline::new(AuthorizationGate::new(ledger), client);
//!
//! let account = "0x0000000000000000000000000000000000000abc";
//! pipeline.request_access(account).await?;
//!
//! let receipt = pipeline
//!     .run(UploadRequest {
//!         account: account.to_string(),
//!         agent: Ed25519Signer::generate()?.did(),
//!         source: UploadSource::Bytes(b"hello".to_vec()),
//!     })
//!     .await?;
//!
//! assert!(receipt.content_id.to_string().starts_with("bafkrei"));
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod space;
pub use space::*;

mod issuer;
pub use issuer::*;

mod upload;
pub use upload::*;

mod pipeline;
pub use pipeline::*;
