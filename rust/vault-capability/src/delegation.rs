//! Signed, scoped capability grants.
//!
//! A [`Delegation`] is issued by a space (its subject) to a single audience
//! and lists the [`Abilities`] the audience may exercise on that space. The
//! payload is encoded as DAG-CBOR and signed by the space's Ed25519 key, so
//! any holder can check it without a network round trip.

use crate::cid::to_dagcbor_cid;
use crate::{Abilities, Ability, Authority, DelegationError, Did, Ed25519Verifier};
use ipld_core::cid::Cid;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of the random nonce that makes every delegation unique.
const NONCE_LENGTH: usize = 16;

/// The unsigned content of a [`Delegation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationPayload {
    #[serde(rename = "iss")]
    issuer: Did,

    #[serde(rename = "aud")]
    audience: Did,

    #[serde(rename = "sub")]
    subject: Did,

    #[serde(rename = "can")]
    abilities: Abilities,

    #[serde(rename = "exp")]
    expiration: Option<u64>,

    #[serde(with = "serde_bytes")]
    nonce: Vec<u8>,
}

impl DelegationPayload {
    fn encode(&self) -> Result<Vec<u8>, DelegationError> {
        serde_ipld_dagcbor::to_vec(self).map_err(|error| DelegationError::Encoding(error.to_string()))
    }
}

/// Grant a set of abilities on a space to another principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    #[serde(rename = "s", with = "serde_bytes")]
    signature: Vec<u8>,

    #[serde(rename = "p")]
    payload: DelegationPayload,
}

impl Delegation {
    /// Creates a blank [`DelegationBuilder`].
    pub fn builder() -> DelegationBuilder {
        DelegationBuilder::default()
    }

    /// Issue a delegation without expiration from `issuer` to `audience`.
    ///
    /// The issuer is also the subject: a space delegates authority over
    /// itself.
    pub fn issue<A: Authority>(
        issuer: &A,
        audience: &Did,
        abilities: Abilities,
    ) -> Result<Self, DelegationError> {
        Self::builder()
            .audience(audience.clone())
            .abilities(abilities)
            .sign(issuer)
    }

    /// Getter for the `issuer` field.
    pub fn issuer(&self) -> &Did {
        &self.payload.issuer
    }

    /// Getter for the `audience` field.
    pub fn audience(&self) -> &Did {
        &self.payload.audience
    }

    /// Getter for the `subject` field.
    pub fn subject(&self) -> &Did {
        &self.payload.subject
    }

    /// Getter for the `abilities` field.
    pub fn abilities(&self) -> &Abilities {
        &self.payload.abilities
    }

    /// Getter for the `expiration` field, in unix seconds.
    pub fn expiration(&self) -> Option<u64> {
        self.payload.expiration
    }

    /// Whether this delegation grants `ability`.
    pub fn allows(&self, ability: Ability) -> bool {
        self.payload.abilities.contains(ability)
    }

    /// Verify the delegation against the current time.
    pub fn verify(&self) -> Result<(), DelegationError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        self.verify_at(now)
    }

    /// Verify the delegation as of `now` (unix seconds).
    ///
    /// Checks that the issuer is the subject, that at least one ability is
    /// granted, that the delegation has not expired, and that the signature
    /// was produced by the issuer's `did:key`.
    pub fn verify_at(&self, now: u64) -> Result<(), DelegationError> {
        let payload = &self.payload;

        if payload.issuer != payload.subject {
            return Err(DelegationError::IssuerNotSubject {
                issuer: payload.issuer.clone(),
                subject: payload.subject.clone(),
            });
        }

        if payload.abilities.is_empty() {
            return Err(DelegationError::EmptyAbilities);
        }

        if let Some(expiration) = payload.expiration {
            if now >= expiration {
                return Err(DelegationError::Expired(expiration));
            }
        }

        let verifier = Ed25519Verifier::try_from(&payload.issuer)
            .map_err(|error| DelegationError::UnsupportedIssuer(payload.issuer.clone(), error))?;

        if !verifier.verify(&payload.encode()?, &self.signature) {
            return Err(DelegationError::InvalidSignature);
        }

        Ok(())
    }

    /// Compute the CID for this delegation.
    pub fn to_cid(&self) -> Result<Cid, DelegationError> {
        to_dagcbor_cid(self)
    }

    /// Encode as DAG-CBOR.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DelegationError> {
        serde_ipld_dagcbor::to_vec(self).map_err(|error| DelegationError::Encoding(error.to_string()))
    }

    /// Decode from DAG-CBOR. The result is not verified.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DelegationError> {
        serde_ipld_dagcbor::from_slice(bytes)
            .map_err(|error| DelegationError::Decoding(error.to_string()))
    }
}

/// Builder for a [`Delegation`].
#[derive(Debug, Clone, Default)]
pub struct DelegationBuilder {
    audience: Option<Did>,
    abilities: Abilities,
    expiration: Option<u64>,
}

impl DelegationBuilder {
    /// Set the audience.
    pub fn audience(mut self, audience: Did) -> Self {
        self.audience = Some(audience);
        self
    }

    /// Set the granted abilities.
    pub fn abilities(mut self, abilities: Abilities) -> Self {
        self.abilities = abilities;
        self
    }

    /// Set an expiration, in unix seconds.
    pub fn expiration(mut self, expiration: u64) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Sign the delegation with `issuer`, who also becomes its subject.
    ///
    /// Without an explicit audience the delegation is addressed back to the
    /// issuer.
    pub fn sign<A: Authority>(self, issuer: &A) -> Result<Delegation, DelegationError> {
        if self.abilities.is_empty() {
            return Err(DelegationError::EmptyAbilities);
        }

        let mut nonce = vec![0u8; NONCE_LENGTH];
        getrandom::getrandom(&mut nonce)?;

        let issuer_did = issuer.did();
        let payload = DelegationPayload {
            audience: self.audience.unwrap_or_else(|| issuer_did.clone()),
            subject: issuer_did.clone(),
            issuer: issuer_did,
            abilities: self.abilities,
            expiration: self.expiration,
            nonce,
        };

        let signature = issuer.sign(&payload.encode()?)?;

        tracing::debug!(
            issuer = %payload.issuer,
            audience = %payload.audience,
            abilities = %payload.abilities,
            "signed delegation"
        );

        Ok(Delegation { signature, payload })
    }
}
