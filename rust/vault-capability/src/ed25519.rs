//! Ed25519 `did:key` signer and verifier.

use crate::{Authority, Did, DidKeyError, KeyError, Principal, SignError};
use base58::{FromBase58, ToBase58};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::str::FromStr;

/// The multicodec prefix for an Ed25519 public key (`ed25519-pub`).
const ED25519_PUB: [u8; 2] = [0xed, 0x01];

/// The textual prefix of a base58btc encoded `did:key`.
const DID_KEY_PREFIX: &str = "did:key:z";

/// An `Ed25519` `did:key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Verifier(VerifyingKey);

impl Ed25519Verifier {
    /// Get the raw public key bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Verify `signature` over `msg`.
    ///
    /// Returns `false` when the signature is malformed or does not match.
    pub fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        self.0.verify(msg, &signature).is_ok()
    }
}

impl From<VerifyingKey> for Ed25519Verifier {
    fn from(key: VerifyingKey) -> Self {
        Ed25519Verifier(key)
    }
}

impl std::fmt::Display for Ed25519Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut raw_bytes = Vec::with_capacity(34);
        raw_bytes.extend_from_slice(&ED25519_PUB);
        raw_bytes.extend_from_slice(&self.0.to_bytes());
        write!(f, "{DID_KEY_PREFIX}{}", raw_bytes.to_base58())
    }
}

impl FromStr for Ed25519Verifier {
    type Err = DidKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 || parts[0] != "did" || parts[1] != "key" {
            return Err(DidKeyError::InvalidDidHeader);
        }
        let b58 = parts[2]
            .strip_prefix('z')
            .ok_or(DidKeyError::MissingBase58Prefix)?;
        let key_bytes = b58.from_base58().map_err(|_| DidKeyError::InvalidBase58)?;
        let raw: [u8; 34] = key_bytes
            .as_slice()
            .try_into()
            .map_err(|_| DidKeyError::InvalidKey)?;
        if raw[..2] != ED25519_PUB {
            return Err(DidKeyError::InvalidKey);
        }
        let key: [u8; 32] = raw[2..].try_into().map_err(|_| DidKeyError::InvalidKey)?;
        let key = VerifyingKey::from_bytes(&key).map_err(|_| DidKeyError::InvalidKey)?;
        Ok(Ed25519Verifier(key))
    }
}

impl TryFrom<&Did> for Ed25519Verifier {
    type Error = DidKeyError;

    fn try_from(did: &Did) -> Result<Self, Self::Error> {
        did.as_str().parse()
    }
}

impl Principal for Ed25519Verifier {
    fn did(&self) -> Did {
        Did::from_str(&self.to_string()).expect("did:key is a valid DID")
    }
}

/// An `Ed25519` `did:key` signer.
///
/// Spaces and agents are both represented by a signer; the public half is
/// their identity on the storage network.
#[derive(Clone)]
pub struct Ed25519Signer {
    verifier: Ed25519Verifier,
    key: SigningKey,
}

impl Ed25519Signer {
    /// Generate a new keypair from the operating system RNG.
    pub fn generate() -> Result<Self, KeyError> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed)?;
        Ok(SigningKey::from_bytes(&seed).into())
    }

    /// Import a keypair from a 32 byte seed.
    pub fn import(seed: &[u8]) -> Result<Self, KeyError> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| KeyError::InvalidSeedLength(seed.len()))?;
        Ok(SigningKey::from_bytes(&seed).into())
    }

    /// Export the 32 byte seed.
    pub fn export(&self) -> [u8; 32] {
        self.key.to_bytes()
    }

    /// The verifier (public `did:key`) for this signer.
    pub fn verifier(&self) -> &Ed25519Verifier {
        &self.verifier
    }
}

impl From<SigningKey> for Ed25519Signer {
    fn from(key: SigningKey) -> Self {
        let verifier = Ed25519Verifier(key.verifying_key());
        Self { verifier, key }
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Ed25519Signer")
            .field(&self.verifier.to_string())
            .finish()
    }
}

impl std::fmt::Display for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.verifier)
    }
}

impl Principal for Ed25519Signer {
    fn did(&self) -> Did {
        self.verifier.did()
    }
}

impl Authority for Ed25519Signer {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignError> {
        Ok(self.key.sign(payload).to_bytes().to_vec())
    }
}
