//! Principal and Authority traits for identity and signing.

use crate::{Did, SignError};

/// An entity identified by a [`Did`].
///
/// Implemented by anything that has a DID: key types, signers, spaces and
/// bare DIDs. Does not imply any cryptographic capability.
pub trait Principal {
    /// Returns this entity's DID.
    fn did(&self) -> Did;
}

impl Principal for Did {
    fn did(&self) -> Did {
        self.clone()
    }
}

/// A principal that can sign payloads.
pub trait Authority: Principal {
    /// Sign the given payload.
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignError>;
}
