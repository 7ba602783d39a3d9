//! Minimal Solidity ABI encoding for single-address contract calls.

use crate::{Address, LedgerError};
use sha3::{Digest, Keccak256};

/// Width of an ABI word in bytes.
const WORD: usize = 32;

/// The 4 byte function selector for a Solidity signature such as
/// `isAuthorized(address)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Calldata for a function taking one `address` argument.
pub fn encode_address_call(signature: &str, account: &Address) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&[0u8; WORD - 20]);
    data.extend_from_slice(account.as_bytes());
    data
}

/// Decode a single `bool` return value from `0x`-prefixed hex.
pub fn decode_bool(output: &str) -> Result<bool, LedgerError> {
    let digits = output.strip_prefix("0x").unwrap_or(output);
    let bytes = hex::decode(digits)
        .map_err(|_| LedgerError::InvalidResponse(format!("return data '{output}' is not hex")))?;

    if bytes.len() != WORD {
        return Err(LedgerError::InvalidResponse(format!(
            "expected a 32 byte bool, got {} bytes",
            bytes.len()
        )));
    }

    if bytes[..WORD - 1].iter().any(|byte| *byte != 0) {
        return Err(LedgerError::InvalidResponse(format!(
            "'{output}' is not an encoded bool"
        )));
    }

    match bytes[WORD - 1] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(LedgerError::InvalidResponse(format!(
            "'{other}' is not an encoded bool"
        ))),
    }
}
