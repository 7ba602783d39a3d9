//! Content identifier helpers.
//!
//! CIDs are v1 with a sha2-256 multihash. See the
//! [multicodec table](https://github.com/multiformats/multicodec/blob/master/table.csv)
//! for the codes used here.

use crate::DelegationError;
use ipld_core::cid::{Cid, multihash::Multihash};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Multicodec code for raw bytes.
pub const RAW: u64 = 0x55;

/// Multicodec code for DAG-CBOR.
pub const DAG_CBOR: u64 = 0x71;

/// Multihash code for sha2-256.
pub const SHA2_256: u64 = 0x12;

/// Compute a CIDv1 for `bytes` using the given codec and sha2-256.
pub fn sha256_cid(codec: u64, bytes: &[u8]) -> Cid {
    let digest = Sha256::digest(bytes);
    let hash = Multihash::<64>::wrap(SHA2_256, &digest)
        .expect("a 32 byte digest always fits a 64 byte multihash");
    Cid::new_v1(codec, hash)
}

/// Encode `value` as DAG-CBOR and compute its CID.
pub fn to_dagcbor_cid<T: Serialize>(value: &T) -> Result<Cid, DelegationError> {
    let bytes = serde_ipld_dagcbor::to_vec(value)
        .map_err(|error| DelegationError::Encoding(error.to_string()))?;
    Ok(sha256_cid(DAG_CBOR, &bytes))
}
