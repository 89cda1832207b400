use std::collections::BTreeMap;

use bytes::Bytes;

use crate::bucket::{BucketPath, PathEntry};
use crate::error::BucketError;

/**
 * Nodes
 * =====
 * The in-memory remote keeps each bucket as a tree of nodes.
 *  A node is just a map of names to links, which fall into two categories:
 *  - Data links: terminal entries i.e. actual file content
 *  - Dir links: other nodes i.e. directories
 * Path names are /-joined link names, so children are kept in
 *  name order, which is also the order listings discover them in.
 */

#[derive(Debug, Clone, PartialEq)]
pub enum NodeLink {
    Data(Bytes),
    Dir(Node),
}

impl NodeLink {
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeLink::Dir(_))
    }

    pub fn size(&self) -> u64 {
        match self {
            NodeLink::Data(data) => data.len() as u64,
            NodeLink::Dir(_) => 0,
        }
    }

    pub fn items_count(&self) -> usize {
        match self {
            NodeLink::Data(_) => 0,
            NodeLink::Dir(node) => node.size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    links: BTreeMap<String, NodeLink>,
}

impl Node {
    pub fn new() -> Self {
        Node {
            links: BTreeMap::new(),
        }
    }

    pub fn get_link(&self, name: &str) -> Option<&NodeLink> {
        self.links.get(name)
    }

    pub fn insert(&mut self, name: String, link: NodeLink) -> Option<NodeLink> {
        self.links.insert(name, link)
    }

    pub fn del(&mut self, name: &str) -> Option<NodeLink> {
        self.links.remove(name)
    }

    pub fn size(&self) -> usize {
        self.links.len()
    }

    /// Resolve a path below this node. Errors name the first missing
    ///  segment and the directory it was looked up in.
    pub fn resolve(&self, path: &BucketPath) -> Result<&NodeLink, BucketError> {
        let mut current = self;
        let mut consumed = BucketPath::root();
        let segments = path.segments();
        for (i, segment) in segments.iter().enumerate() {
            let link = current
                .get_link(segment)
                .ok_or_else(|| BucketError::no_link(segment, &consumed.to_string()))?;
            if i + 1 == segments.len() {
                return Ok(link);
            }
            match link {
                NodeLink::Dir(node) => current = node,
                NodeLink::Data(_) => {
                    let next = &segments[i + 1];
                    return Err(BucketError::no_link(next, &consumed.join(segment).to_string()));
                }
            }
            consumed = consumed.join(segment);
        }
        Err(BucketError::InvalidPath(path.to_string()))
    }

    /// Set file content at `path`, creating intermediate directories.
    ///  Returns whether a new entry was created (as opposed to overwritten).
    pub fn set_data_at_path(&mut self, path: &BucketPath, data: Bytes) -> Result<bool, BucketError> {
        let (parents, name) = match path.segments().split_last() {
            Some((name, parents)) => (parents, name),
            None => return Err(BucketError::InvalidPath(path.to_string())),
        };

        let mut node = self;
        for part in parents {
            let next = node
                .links
                .entry(part.clone())
                .or_insert_with(|| NodeLink::Dir(Node::default()));
            node = match next {
                NodeLink::Dir(dir) => dir,
                NodeLink::Data(_) => return Err(BucketError::InvalidPath(path.to_string())),
            };
        }

        if let Some(NodeLink::Dir(_)) = node.get_link(name) {
            return Err(BucketError::InvalidPath(path.to_string()));
        }
        Ok(node.insert(name.clone(), NodeLink::Data(data)).is_none())
    }

    /// Remove the entry at `path` along with everything below it
    pub fn remove_at_path(&mut self, path: &BucketPath) -> Result<NodeLink, BucketError> {
        let parent = path
            .parent()
            .ok_or_else(|| BucketError::InvalidPath(path.to_string()))?;
        let name = path
            .name()
            .ok_or_else(|| BucketError::InvalidPath(path.to_string()))?;

        let mut node = self;
        let mut consumed = BucketPath::root();
        for part in parent.segments() {
            node = match node.links.get_mut(part) {
                Some(NodeLink::Dir(dir)) => dir,
                _ => return Err(BucketError::no_link(part, &consumed.to_string())),
            };
            consumed = consumed.join(part);
        }
        node.del(name)
            .ok_or_else(|| BucketError::no_link(name, &consumed.to_string()))
    }

    /// Flat listing rows for the entry at `path` and up to `depth` levels
    ///  of descendants, depth first with parents ahead of children
    pub fn entries(&self, path: &BucketPath, depth: u32) -> Result<Vec<PathEntry>, BucketError> {
        let mut out = Vec::new();
        if path.is_root() {
            out.push(PathEntry {
                path: String::new(),
                is_dir: true,
                size: 0,
                items_count: self.size(),
            });
            if depth > 0 {
                self.walk_children(path, depth - 1, &mut out);
            }
        } else {
            Self::walk(path, self.resolve(path)?, depth, &mut out);
        }
        Ok(out)
    }

    fn walk(path: &BucketPath, link: &NodeLink, depth: u32, out: &mut Vec<PathEntry>) {
        out.push(PathEntry {
            path: path.to_string(),
            is_dir: link.is_dir(),
            size: link.size(),
            items_count: link.items_count(),
        });
        if depth == 0 {
            return;
        }
        if let NodeLink::Dir(node) = link {
            node.walk_children(path, depth - 1, out);
        }
    }

    fn walk_children(&self, path: &BucketPath, depth: u32, out: &mut Vec<PathEntry>) {
        for (name, child) in self.links.iter() {
            Self::walk(&path.join(name), child, depth, out);
        }
    }
}
