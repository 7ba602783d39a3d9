use crate::Did;
use thiserror::Error;

/// Errors that can occur when parsing a [`Did`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DidParseError {
    /// The string does not start with `did:`.
    #[error("missing 'did:' scheme in '{0}'")]
    MissingScheme(String),

    /// The method segment is empty or contains invalid characters.
    #[error("invalid did method in '{0}'")]
    InvalidMethod(String),

    /// The method-specific identifier is empty.
    #[error("missing method-specific identifier in '{0}'")]
    MissingIdentifier(String),
}

/// Errors that can occur when decoding an Ed25519 `did:key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DidKeyError {
    /// The DID header is not `did:key`.
    #[error("invalid did header")]
    InvalidDidHeader,

    /// The base58 prefix 'z' is missing.
    #[error("missing base58 prefix 'z'")]
    MissingBase58Prefix,

    /// The base58 encoding is invalid.
    #[error("invalid base58 encoding")]
    InvalidBase58,

    /// The key bytes are invalid.
    #[error("invalid key bytes")]
    InvalidKey,
}

/// Errors from generating or importing Ed25519 key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The seed bytes have the wrong length (expected 32).
    #[error("expected 32 seed bytes, got {0}")]
    InvalidSeedLength(usize),

    /// Random number generation failed.
    #[error("RNG error: {0}")]
    Rng(#[from] getrandom::Error),
}

/// Error that can occur during signing operations.
#[derive(Debug, Error)]
pub enum SignError {
    /// The signing key is not available or cannot be used.
    #[error("Signing key unavailable: {0}")]
    KeyUnavailable(String),

    /// An error occurred during the signing operation.
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Errors produced while issuing, encoding or verifying a
/// [`Delegation`](crate::Delegation).
#[derive(Debug, Error)]
pub enum DelegationError {
    /// The issuing authority could not produce a signature.
    #[error("Could not sign delegation: {0}")]
    Signing(#[from] SignError),

    /// The nonce could not be generated.
    #[error("Could not generate delegation nonce: {0}")]
    Nonce(#[from] getrandom::Error),

    /// A delegation must grant at least one ability.
    #[error("Delegation grants no abilities")]
    EmptyAbilities,

    /// The payload could not be encoded as DAG-CBOR.
    #[error("Could not encode delegation: {0}")]
    Encoding(String),

    /// The bytes could not be decoded into a delegation.
    #[error("Could not decode delegation: {0}")]
    Decoding(String),

    /// The issuer is not the subject the delegation is about.
    #[error("Issuer '{issuer}' is not the subject '{subject}'")]
    IssuerNotSubject {
        /// The issuer DID.
        issuer: Did,
        /// The subject DID.
        subject: Did,
    },

    /// The issuer DID cannot be resolved to an Ed25519 verifying key.
    #[error("Unsupported issuer '{0}': {1}")]
    UnsupportedIssuer(Did, DidKeyError),

    /// The signature does not match the payload and issuer.
    #[error("Delegation signature is invalid")]
    InvalidSignature,

    /// The delegation expired at the given unix timestamp (seconds).
    #[error("Delegation expired at {0}")]
    Expired(u64),
}
