use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A version of a bucket.
///
/// `key` is the bucket's stable identity; `path` changes on every
///  successful mutation and is what the fast-forward check compares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRoot {
    pub key: String,
    pub name: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BucketRoot {
    /// Whether `other` describes the same version of the same bucket
    pub fn same_version(&self, other: &BucketRoot) -> bool {
        self.key == other.key && self.path == other.path
    }
}

/// Identifies the thread (namespace) a bucket lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreadId(Uuid);

impl ThreadId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ThreadId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOptions {
    /// Name of the thread to open the bucket in when no thread scope is
    ///  set on the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_name: Option<String>,
    pub encrypted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub www: Option<String>,
    pub ipns: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReply {
    pub root: BucketRoot,
    pub thread_id: ThreadId,
    pub links: Links,
}
