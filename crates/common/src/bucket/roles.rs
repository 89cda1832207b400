//! # Access roles
//!
//! Roles map principals (opaque identity strings, e.g. public keys) to a
//!  privilege level on a path within a bucket.
//!
//! ## Trust Model
//!
//! The client only transports role maps. Enforcement happens on the remote:
//!  a role set at some path applies to that path and everything below it,
//!  and a deeper scope naming the same principal overrides a shallower one.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Privilege of a principal at a path, ordered
///  `None < Reader < Writer < Admin`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessRole {
    /// No access. Also used to revoke a previous grant.
    #[default]
    None,
    /// May list and pull content
    Reader,
    /// May additionally overwrite existing files
    Writer,
    /// May additionally create and remove entries and manage roles
    Admin,
}

impl AccessRole {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for AccessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessRole::None => write!(f, "none"),
            AccessRole::Reader => write!(f, "reader"),
            AccessRole::Writer => write!(f, "writer"),
            AccessRole::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown access role: {0}")]
pub struct UnknownRole(String);

impl TryFrom<u8> for AccessRole {
    type Error = UnknownRole;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AccessRole::None),
            1 => Ok(AccessRole::Reader),
            2 => Ok(AccessRole::Writer),
            3 => Ok(AccessRole::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl std::str::FromStr for AccessRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "0" => Ok(AccessRole::None),
            "reader" | "read" | "1" => Ok(AccessRole::Reader),
            "writer" | "write" | "2" => Ok(AccessRole::Writer),
            "admin" | "3" => Ok(AccessRole::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Principal -> role mapping for one path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessRoles(BTreeMap<String, AccessRole>);

impl AccessRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, principal: impl Into<String>, role: AccessRole) -> Option<AccessRole> {
        self.0.insert(principal.into(), role)
    }

    pub fn with(mut self, principal: impl Into<String>, role: AccessRole) -> Self {
        self.insert(principal, role);
        self
    }

    pub fn get(&self, principal: &str) -> Option<AccessRole> {
        self.0.get(principal).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AccessRole)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, AccessRole)> for AccessRoles {
    fn from_iter<T: IntoIterator<Item = (String, AccessRole)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_role_order() {
        assert!(AccessRole::None < AccessRole::Reader);
        assert!(AccessRole::Reader < AccessRole::Writer);
        assert!(AccessRole::Writer < AccessRole::Admin);
        assert_eq!(AccessRole::try_from(2).unwrap(), AccessRole::Writer);
        assert_eq!(AccessRole::Writer.as_u8(), 2);
        assert!(AccessRole::try_from(7).is_err());
        assert_eq!("write".parse::<AccessRole>().unwrap(), AccessRole::Writer);
    }

    #[test]
    fn test_roles_serialize_as_map() {
        let roles = AccessRoles::new().with("bob", AccessRole::Writer);
        let json = serde_json::to_string(&roles).unwrap();
        assert_eq!(json, r#"{"bob":"writer"}"#);
        let back: AccessRoles = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("bob"), Some(AccessRole::Writer));
    }
}
