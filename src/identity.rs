//! Identity references carried by session tokens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of identity a route requires tokens to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    User,
    Artist,
    Admin,
}

impl IdentityKind {
    pub const ALL: [IdentityKind; 3] = [IdentityKind::User, IdentityKind::Artist, IdentityKind::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityKind::User => "user",
            IdentityKind::Artist => "artist",
            IdentityKind::Admin => "admin",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown identity kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown identity kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for IdentityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(IdentityKind::User),
            "artist" => Ok(IdentityKind::Artist),
            "admin" => Ok(IdentityKind::Admin),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// An identity a session is minted for. The kind is fixed at mint time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdentityRef {
    pub id: i64,
    pub kind: IdentityKind,
}

impl IdentityRef {
    pub fn new(id: i64, kind: IdentityKind) -> Self {
        Self { id, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("user".parse::<IdentityKind>(), Ok(IdentityKind::User));
        assert_eq!("artist".parse::<IdentityKind>(), Ok(IdentityKind::Artist));
        assert_eq!("admin".parse::<IdentityKind>(), Ok(IdentityKind::Admin));
        assert!("Admin".parse::<IdentityKind>().is_err());
        assert!("".parse::<IdentityKind>().is_err());
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&IdentityKind::Artist).unwrap();
        assert_eq!(json, "\"artist\"");
        for kind in IdentityKind::ALL {
            assert_eq!(kind.as_str().parse::<IdentityKind>(), Ok(kind));
        }
    }
}
