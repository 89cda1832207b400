use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bucket::{BucketItem, BucketPath, BucketRoot, PathEntry};
use crate::error::BucketError;
use crate::remote::Remote;

/// Depth used when the caller does not ask for one
pub const DEFAULT_LIST_DEPTH: u32 = 1;
/// Depth used by flattened listings when the caller does not ask for one
pub const DEFAULT_FLAT_DEPTH: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPathResult {
    /// Root as observed when the listing was taken
    pub root: BucketRoot,
    pub item: BucketItem,
}

pub(crate) async fn list_path(
    remote: &dyn Remote,
    key: &str,
    path: &BucketPath,
    depth: Option<u32>,
) -> Result<ListPathResult, BucketError> {
    let depth = depth.unwrap_or(DEFAULT_LIST_DEPTH);
    if depth == 0 {
        return Err(BucketError::InvalidDepth(depth));
    }
    let reply = remote.list_path(key, path, depth).await?;
    tracing::debug!(
        "listed {} entries under {:?} in {}",
        reply.entries.len(),
        path.to_string(),
        key
    );
    Ok(ListPathResult {
        root: reply.root,
        item: build_tree(reply.entries)?,
    })
}

pub(crate) async fn list_path_flat(
    remote: &dyn Remote,
    key: &str,
    path: &BucketPath,
    dirs: bool,
    depth: Option<u32>,
) -> Result<Vec<String>, BucketError> {
    let result = list_path(
        remote,
        key,
        path,
        Some(depth.unwrap_or(DEFAULT_FLAT_DEPTH)),
    )
    .await?;
    Ok(flatten(&result.item, dirs))
}

/// Rebuild a tree from flat listing rows.
///
/// The first row is the listed item; every later row must come after its
///  parent. Nodes live in an arena indexed by path, with parents found by
///  lookup, and are folded into their parents from the back.
pub fn build_tree(entries: Vec<PathEntry>) -> Result<BucketItem, BucketError> {
    let mut nodes: Vec<BucketItem> = Vec::with_capacity(entries.len());
    let mut parents: Vec<usize> = Vec::with_capacity(entries.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(entries.len());

    for (i, entry) in entries.into_iter().enumerate() {
        let (parent, name) = match entry.path.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", entry.path.as_str()),
        };
        if i == 0 {
            parents.push(0);
        } else {
            let parent = *index.get(parent).ok_or_else(|| {
                BucketError::Transport(format!("listing entry {:?} has no parent", entry.path))
            })?;
            parents.push(parent);
        }

        let name = name.to_string();
        index.insert(entry.path.clone(), i);
        nodes.push(BucketItem {
            name,
            path: entry.path,
            is_dir: entry.is_dir,
            size: entry.size,
            items: Vec::new(),
            items_count: entry.items_count,
        });
    }

    // children always sit after their parent, so popping from the back
    //  finishes every subtree before it is moved
    while nodes.len() > 1 {
        let at = nodes.len() - 1;
        let Some(mut item) = nodes.pop() else { break };
        item.items.reverse();
        nodes[parents[at]].items.push(item);
    }
    let mut root = nodes
        .pop()
        .ok_or_else(|| BucketError::Transport("empty listing".to_string()))?;
    root.items.reverse();
    Ok(root)
}

/// Full paths of every item below `item`, depth first with parents ahead
///  of their children. With `dirs` false only files are returned.
pub fn flatten(item: &BucketItem, dirs: bool) -> Vec<String> {
    let mut out = Vec::new();
    walk(item, dirs, &mut out);
    out
}

fn walk(item: &BucketItem, dirs: bool, out: &mut Vec<String>) {
    for child in &item.items {
        if child.is_file() || dirs {
            out.push(child.path.clone());
        }
        walk(child, dirs, out);
    }
}
