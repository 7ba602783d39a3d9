//! Capability primitives for the upload vault.
//!
//! This crate provides the identity and authorization vocabulary shared by
//! the rest of the workspace:
//!
//! - [`Did`] identifies any principal on the storage network.
//! - [`Ed25519Signer`] / [`Ed25519Verifier`] implement `did:key` identities
//!   backed by Ed25519 keys. Spaces and agents are both `did:key`s.
//! - [`Ability`] and [`Abilities`] name the operations a delegation may
//!   grant. The vocabulary is closed: only `space/blob/add` and `upload/add`
//!   can be expressed, so a delegation can never carry more than that.
//! - [`Delegation`] is a signed grant from a space to a single audience.
//!
//! # Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use vault_capability::{Abilities, Ability, Delegation, Ed25519Signer, Principal};
//!
//! let space = Ed25519Signer::import(&[1; 32])?;
//! let agent = Ed25519Signer::import(&[2; 32])?;
//!
//! let delegation = Delegation::issue(&space, &agent.did(), Abilities::upload())?;
//!
//! delegation.verify()?;
//! assert!(delegation.allows(Ability::BlobAdd));
//! assert!(delegation.allows(Ability::UploadAdd));
//! assert_eq!(delegation.audience(), &agent.did());
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod did;
pub use did::*;

mod principal;
pub use principal::*;

mod ed25519;
pub use ed25519::*;

mod ability;
pub use ability::*;

pub mod cid;

mod delegation;
pub use delegation::*;
