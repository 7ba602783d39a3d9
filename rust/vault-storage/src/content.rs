use crate::ContentIdError;
use ipld_core::cid::Cid;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use vault_capability::cid::{RAW, sha256_cid};

/// The content identifier of an uploaded file.
///
/// Always a CIDv1 with the raw codec and a sha2-256 multihash, so identical
/// bytes always yield the identical identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(Cid);

impl ContentId {
    /// Derive the identifier for `bytes`.
    pub fn for_bytes(bytes: &[u8]) -> Self {
        ContentId(sha256_cid(RAW, bytes))
    }

    /// The underlying CID.
    pub fn cid(&self) -> &Cid {
        &self.0
    }
}

impl FromStr for ContentId {
    type Err = ContentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cid = Cid::try_from(s).map_err(|_| ContentIdError::Invalid(s.to_string()))?;
        if cid.codec() != RAW {
            return Err(ContentIdError::UnexpectedCodec {
                cid: s.to_string(),
                codec: cid.codec(),
            });
        }
        Ok(ContentId(cid))
    }
}

impl TryFrom<String> for ContentId {
    type Error = ContentIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentId> for String {
    fn from(content: ContentId) -> Self {
        content.to_string()
    }
}

impl Display for ContentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_bytes_have_identical_identifiers() {
        assert_eq!(ContentId::for_bytes(b"hello"), ContentId::for_bytes(b"hello"));
        assert_ne!(ContentId::for_bytes(b"hello"), ContentId::for_bytes(b"hello!"));
    }

    #[test]
    fn it_round_trips_through_strings() -> anyhow::Result<()> {
        let content = ContentId::for_bytes(b"hello");
        let text = content.to_string();

        assert!(text.starts_with("bafkrei"));
        assert_eq!(text.parse::<ContentId>()?, content);
        assert_eq!(serde_json::to_string(&content)?, format!("\"{text}\""));
        Ok(())
    }

    #[test]
    fn it_rejects_non_raw_cids() {
        let dag = sha256_cid(vault_capability::cid::DAG_CBOR, b"hello").to_string();

        assert!(matches!(
            dag.parse::<ContentId>(),
            Err(ContentIdError::UnexpectedCodec { codec: 0x71, .. })
        ));
        assert!(matches!(
            "not-a-cid".parse::<ContentId>(),
            Err(ContentIdError::Invalid(_))
        ));
    }
}
