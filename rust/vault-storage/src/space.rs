use vault_capability::Did;

/// Identifier of a space: the `did:key` of its signing key.
pub type SpaceId = Did;

/// A space as listed by the storage network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceInfo {
    /// The space DID.
    pub did: SpaceId,
    /// Human readable name given at creation.
    pub name: String,
}
