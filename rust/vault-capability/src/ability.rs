use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// An operation that a delegation may grant on a space.
///
/// The set is deliberately closed. Anything outside of it (creating or
/// deleting spaces, re-delegating) cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    /// Store a blob of bytes in a space.
    #[serde(rename = "space/blob/add")]
    BlobAdd,
    /// Register an upload (a root CID) in a space.
    #[serde(rename = "upload/add")]
    UploadAdd,
}

impl Ability {
    /// The command path of this ability.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Ability::BlobAdd => "space/blob/add",
            Ability::UploadAdd => "upload/add",
        }
    }
}

impl Display for Ability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The given string is not a known ability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ability '{0}'")]
pub struct UnknownAbility(pub String);

impl FromStr for Ability {
    type Err = UnknownAbility;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "space/blob/add" => Ok(Ability::BlobAdd),
            "upload/add" => Ok(Ability::UploadAdd),
            other => Err(UnknownAbility(other.to_string())),
        }
    }
}

/// An ordered set of [`Ability`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abilities(BTreeSet<Ability>);

impl Abilities {
    /// Exactly the abilities needed to upload content into a space.
    pub fn upload() -> Self {
        [Ability::BlobAdd, Ability::UploadAdd].into_iter().collect()
    }

    /// Whether `ability` is in this set.
    pub fn contains(&self, ability: Ability) -> bool {
        self.0.contains(&ability)
    }

    /// Whether every ability of `other` is also in this set.
    pub fn covers(&self, other: &Abilities) -> bool {
        other.0.is_subset(&self.0)
    }

    /// Number of abilities in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the abilities in order.
    pub fn iter(&self) -> impl Iterator<Item = Ability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Ability> for Abilities {
    fn from_iter<T: IntoIterator<Item = Ability>>(iter: T) -> Self {
        Abilities(iter.into_iter().collect())
    }
}

impl Display for Abilities {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(|ability| ability.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn upload_abilities_are_exactly_blob_add_and_upload_add() {
        let abilities = Abilities::upload();
        assert_eq!(abilities.len(), 2);
        assert!(abilities.contains(Ability::BlobAdd));
        assert!(abilities.contains(Ability::UploadAdd));
        assert_eq!(abilities.to_string(), "[space/blob/add, upload/add]");
    }

    #[test]
    fn it_checks_coverage() {
        let upload = Abilities::upload();
        let blob_only: Abilities = [Ability::BlobAdd].into_iter().collect();

        assert!(upload.covers(&blob_only));
        assert!(!blob_only.covers(&upload));
        assert!(upload.covers(&Abilities::default()));
    }

    #[test]
    fn it_serializes_as_command_paths() {
        let json = serde_json::to_string(&Abilities::upload()).unwrap();
        assert_eq!(json, r#"["space/blob/add","upload/add"]"#);
    }

    #[test]
    fn it_refuses_abilities_outside_the_vocabulary() {
        assert!(serde_json::from_str::<Abilities>(r#"["space/blob/add","space/delete"]"#).is_err());
        assert_eq!(
            "*".parse::<Ability>(),
            Err(UnknownAbility("*".to_string()))
        );
        assert_eq!("upload/add".parse::<Ability>(), Ok(Ability::UploadAdd));
    }
}
