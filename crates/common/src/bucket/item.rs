use serde::{Deserialize, Serialize};

/// One row of a flat, depth-limited listing as returned by a remote.
///
/// Rows come in discovery order: the listed item first, then a depth-first
///  walk with parents ahead of their children. `path` is relative to the
///  bucket root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub path: String,
    pub is_dir: bool,
    /// Byte length for files, zero for directories
    pub size: u64,
    /// Number of children for directories, whether or not they were listed
    pub items_count: usize,
}

/// A node of a bucket tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketItem {
    pub name: String,
    /// Full path relative to the bucket root
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    /// Children in discovery order. Empty for files and for directories
    ///  past the requested depth.
    pub items: Vec<BucketItem>,
    /// Number of children the remote reports, even when `items` was not
    ///  expanded
    pub items_count: usize,
}

impl BucketItem {
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// Find a direct child by name
    pub fn child(&self, name: &str) -> Option<&BucketItem> {
        self.items.iter().find(|item| item.name == name)
    }
}
