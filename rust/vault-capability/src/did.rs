use crate::DidParseError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A [decentralized identifier](https://www.w3.org/TR/did-core/).
///
/// Only the generic `did:<method>:<identifier>` shape is validated here;
/// method-specific decoding (e.g. `did:key`) happens where a key is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// The full DID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DID method, e.g. `key` for `did:key:z6Mk...`.
    pub fn method(&self) -> &str {
        self.0
            .split(':')
            .nth(1)
            .unwrap_or_default()
    }
}

impl FromStr for Did {
    type Err = DidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("did:")
            .ok_or_else(|| DidParseError::MissingScheme(s.to_string()))?;

        let (method, identifier) = rest
            .split_once(':')
            .ok_or_else(|| DidParseError::MissingIdentifier(s.to_string()))?;

        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(DidParseError::InvalidMethod(s.to_string()));
        }

        if identifier.is_empty() {
            return Err(DidParseError::MissingIdentifier(s.to_string()));
        }

        Ok(Did(s.to_string()))
    }
}

impl TryFrom<String> for Did {
    type Error = DidParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl Display for Did {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_did_key() {
        let did: Did = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"
            .parse()
            .unwrap();
        assert_eq!(did.method(), "key");
    }

    #[test]
    fn it_accepts_other_methods() {
        let did: Did = "did:web:example.com".parse().unwrap();
        assert_eq!(did.method(), "web");
        assert_eq!(did.to_string(), "did:web:example.com");
    }

    #[test]
    fn it_rejects_malformed_dids() {
        assert!(matches!(
            "key:z6Mk".parse::<Did>(),
            Err(DidParseError::MissingScheme(_))
        ));
        assert!(matches!(
            "did:key".parse::<Did>(),
            Err(DidParseError::MissingIdentifier(_))
        ));
        assert!(matches!(
            "did::abc".parse::<Did>(),
            Err(DidParseError::InvalidMethod(_))
        ));
        assert!(matches!(
            "did:KEY:abc".parse::<Did>(),
            Err(DidParseError::InvalidMethod(_))
        ));
        assert!(matches!(
            "did:key:".parse::<Did>(),
            Err(DidParseError::MissingIdentifier(_))
        ));
    }

    #[test]
    fn it_serializes_as_a_string() {
        let did: Did = "did:web:example.com".parse().unwrap();
        let json = serde_json::to_string(&did).unwrap();
        assert_eq!(json, "\"did:web:example.com\"");

        let parsed: Did = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, did);

        assert!(serde_json::from_str::<Did>("\"not-a-did\"").is_err());
    }
}
