use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use parking_lot::RwLock;
use uuid::Uuid;

use super::node::{Node, NodeLink};
use super::provider::{ChunkStream, ListPathReply, PushPathReply, Remote};
use crate::bucket::{
    AccessRole, AccessRoles, BucketPath, BucketRoot, CreateOptions, CreateReply, Links, ThreadId,
};
use crate::chunks::{gen_chunks, CHUNK_SIZE};
use crate::error::BucketError;

/// Name of the marker file every new bucket is seeded with
pub const SEED_NAME: &str = ".bucketseed";
/// Thread used when neither a thread id nor a thread name is given
pub const DEFAULT_THREAD: &str = "default";

const DEFAULT_GATEWAY: &str = "http://127.0.0.1:8006";

/// A bucket service living entirely in memory.
///
/// Clones share storage. Each handle acts as one principal, so
///  [`MemoryRemote::as_principal`] is how tests model a second user
///  talking to the same service.
#[derive(Debug, Clone)]
pub struct MemoryRemote {
    inner: Arc<RwLock<MemoryRemoteInner>>,
    principal: String,
    chunk_size: usize,
    gateway: String,
}

#[derive(Debug, Default)]
struct MemoryRemoteInner {
    /// thread name -> thread id
    threads: HashMap<String, ThreadId>,
    /// bucket key -> bucket
    buckets: HashMap<String, StoredBucket>,
}

#[derive(Debug)]
struct StoredBucket {
    root: BucketRoot,
    thread: ThreadId,
    owner: String,
    links: Links,
    tree: Node,
    /// Role scopes, keyed by the path they were pushed to
    roles: BTreeMap<BucketPath, AccessRoles>,
}

impl StoredBucket {
    /// Effective role of `principal` at `path`: the deepest scope at or
    ///  above the path that names the principal wins
    fn role_of(&self, principal: &str, path: &BucketPath) -> AccessRole {
        if principal == self.owner {
            return AccessRole::Admin;
        }
        path.lineage()
            .filter_map(|scope| self.roles.get(&scope).and_then(|r| r.get(principal)))
            .last()
            .unwrap_or_default()
    }

    /// Whether `principal` holds any role at, above or below `path`
    fn can_see(&self, principal: &str, path: &BucketPath) -> bool {
        if self.role_of(principal, path) > AccessRole::None {
            return true;
        }
        self.roles.iter().any(|(scope, roles)| {
            scope.starts_with(path) && roles.get(principal).unwrap_or_default() > AccessRole::None
        })
    }

    fn require(&self, principal: &str, path: &BucketPath, min: AccessRole) -> Result<(), BucketError> {
        if self.role_of(principal, path) >= min {
            Ok(())
        } else {
            Err(BucketError::PermissionDenied(path.to_string()))
        }
    }

    /// Overwriting a file needs writer at the file. Creating one changes
    ///  the parent listing and needs admin there.
    fn require_push(&self, principal: &str, path: &BucketPath) -> Result<(), BucketError> {
        match self.tree.resolve(path) {
            Ok(NodeLink::Data(_)) => self.require(principal, path, AccessRole::Writer),
            Ok(NodeLink::Dir(_)) => Err(BucketError::InvalidPath(path.to_string())),
            Err(_) => self.require(principal, &parent_of(path), AccessRole::Admin),
        }
    }

    fn check_root(&self, expected: &BucketRoot) -> Result<(), BucketError> {
        if self.root.same_version(expected) {
            Ok(())
        } else {
            Err(BucketError::NonFastForward)
        }
    }

    /// Move the bucket to a new version derived from the current one
    fn advance(&mut self, op: &str, path: &BucketPath, content: &[u8]) {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.root.path.as_bytes());
        hasher.update(op.as_bytes());
        hasher.update(path.to_string().as_bytes());
        hasher.update(content);
        self.root.path = version_path(hasher.finalize());
        self.root.updated_at = Utc::now();
    }
}

fn parent_of(path: &BucketPath) -> BucketPath {
    path.parent().unwrap_or_default()
}

fn version_path(hash: blake3::Hash) -> String {
    format!("/bucket/{}", hash.to_hex())
}

impl MemoryRemote {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryRemoteInner::default())),
            principal: principal.into(),
            chunk_size: CHUNK_SIZE,
            gateway: DEFAULT_GATEWAY.to_string(),
        }
    }

    /// A handle on the same storage acting as another principal
    pub fn as_principal(&self, principal: impl Into<String>) -> Self {
        Self {
            inner: self.inner.clone(),
            principal: principal.into(),
            chunk_size: self.chunk_size,
            gateway: self.gateway.clone(),
        }
    }

    /// Size of the chunks pulls are served in
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into().trim_end_matches('/').to_string();
        self
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    fn resolve_thread(
        inner: &mut MemoryRemoteInner,
        thread: Option<ThreadId>,
        opts: &CreateOptions,
    ) -> ThreadId {
        if let Some(thread) = thread {
            return thread;
        }
        let name = opts
            .thread_name
            .clone()
            .unwrap_or_else(|| DEFAULT_THREAD.to_string());
        *inner
            .threads
            .entry(name)
            .or_insert_with(ThreadId::generate)
    }

    fn create_in(
        &self,
        inner: &mut MemoryRemoteInner,
        thread: ThreadId,
        name: &str,
        opts: &CreateOptions,
    ) -> CreateReply {
        let key = Uuid::new_v4().simple().to_string();
        let seed: [u8; 32] = rand::random();
        let now = Utc::now();

        let mut tree = Node::new();
        tree.insert(
            SEED_NAME.to_string(),
            NodeLink::Data(Bytes::copy_from_slice(&seed)),
        );

        let mut hasher = blake3::Hasher::new();
        hasher.update(key.as_bytes());
        hasher.update(&seed);

        let root = BucketRoot {
            key: key.clone(),
            name: name.to_string(),
            path: version_path(hasher.finalize()),
            created_at: now,
            updated_at: now,
        };
        let links = Links {
            url: format!("{}/thread/{}/buckets/{}", self.gateway, thread, key),
            www: (!opts.encrypted).then(|| format!("{}/www/{}", self.gateway, key)),
            ipns: format!("{}/ipns/{}", self.gateway, key),
        };

        tracing::debug!("created bucket {} ({}) in thread {}", name, key, thread);
        inner.buckets.insert(
            key,
            StoredBucket {
                root: root.clone(),
                thread,
                owner: self.principal.clone(),
                links: links.clone(),
                tree,
                roles: BTreeMap::new(),
            },
        );

        CreateReply {
            root,
            thread_id: thread,
            links,
        }
    }
}

fn bucket<'a>(inner: &'a MemoryRemoteInner, key: &str) -> Result<&'a StoredBucket, BucketError> {
    inner
        .buckets
        .get(key)
        .ok_or_else(|| BucketError::BucketNotFound(key.to_string()))
}

fn bucket_mut<'a>(
    inner: &'a mut MemoryRemoteInner,
    key: &str,
) -> Result<&'a mut StoredBucket, BucketError> {
    inner
        .buckets
        .get_mut(key)
        .ok_or_else(|| BucketError::BucketNotFound(key.to_string()))
}

#[async_trait]
impl Remote for MemoryRemote {
    async fn open_or_create(
        &self,
        thread: Option<ThreadId>,
        name: &str,
        opts: &CreateOptions,
    ) -> Result<CreateReply, BucketError> {
        let mut inner = self.inner.write();
        let thread = Self::resolve_thread(&mut inner, thread, opts);

        let existing = inner.buckets.values().find(|b| {
            b.thread == thread && b.root.name == name && b.can_see(&self.principal, &BucketPath::root())
        });
        if let Some(bucket) = existing {
            tracing::debug!("opened bucket {} ({})", name, bucket.root.key);
            return Ok(CreateReply {
                root: bucket.root.clone(),
                thread_id: thread,
                links: bucket.links.clone(),
            });
        }
        Ok(self.create_in(&mut inner, thread, name, opts))
    }

    async fn create(
        &self,
        thread: Option<ThreadId>,
        name: &str,
        opts: &CreateOptions,
    ) -> Result<CreateReply, BucketError> {
        let mut inner = self.inner.write();
        let thread = Self::resolve_thread(&mut inner, thread, opts);
        Ok(self.create_in(&mut inner, thread, name, opts))
    }

    async fn list_buckets(
        &self,
        thread: Option<ThreadId>,
    ) -> Result<Vec<BucketRoot>, BucketError> {
        let inner = self.inner.read();
        let mut roots: Vec<BucketRoot> = inner
            .buckets
            .values()
            .filter(|b| thread.map_or(true, |t| b.thread == t))
            .filter(|b| b.can_see(&self.principal, &BucketPath::root()))
            .map(|b| b.root.clone())
            .collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(roots)
    }

    async fn list_owned(&self) -> Result<Vec<BucketRoot>, BucketError> {
        let inner = self.inner.read();
        let mut roots: Vec<BucketRoot> = inner
            .buckets
            .values()
            .filter(|b| b.owner == self.principal)
            .map(|b| b.root.clone())
            .collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(roots)
    }

    async fn list_path(
        &self,
        key: &str,
        path: &BucketPath,
        depth: u32,
    ) -> Result<ListPathReply, BucketError> {
        let inner = self.inner.read();
        let bucket = bucket(&inner, key)?;
        if !bucket.can_see(&self.principal, path) {
            return Err(BucketError::PermissionDenied(path.to_string()));
        }
        let entries = bucket.tree.entries(path, depth)?;
        Ok(ListPathReply {
            root: bucket.root.clone(),
            entries,
        })
    }

    async fn push_path(
        &self,
        key: &str,
        path: &BucketPath,
        root: Option<BucketRoot>,
        chunks: ChunkStream,
    ) -> Result<PushPathReply, BucketError> {
        if path.is_root() {
            return Err(BucketError::InvalidPath(path.to_string()));
        }

        let expected = {
            let inner = self.inner.read();
            let bucket = bucket(&inner, key)?;
            let expected = root.unwrap_or_else(|| bucket.root.clone());
            bucket.check_root(&expected)?;
            bucket.require_push(&self.principal, path)?;
            expected
        };

        // receive everything before touching the tree
        let content = chunks
            .try_fold(BytesMut::new(), |mut buf, chunk| async move {
                buf.extend_from_slice(&chunk);
                Ok::<_, BucketError>(buf)
            })
            .await?
            .freeze();

        let mut inner = self.inner.write();
        let bucket = bucket_mut(&mut inner, key)?;
        bucket.check_root(&expected)?;
        bucket.require_push(&self.principal, path)?;

        let size = content.len() as u64;
        bucket.advance("push", path, &content);
        bucket.tree.set_data_at_path(path, content)?;
        tracing::debug!("stored {} bytes at {} in {}", size, path, key);

        Ok(PushPathReply {
            root: bucket.root.clone(),
            path: path.to_string(),
            size,
        })
    }

    async fn pull_path(&self, key: &str, path: &BucketPath) -> Result<ChunkStream, BucketError> {
        let data = {
            let inner = self.inner.read();
            let bucket = bucket(&inner, key)?;
            bucket.require(&self.principal, path, AccessRole::Reader)?;
            match bucket.tree.resolve(path) {
                Ok(NodeLink::Data(data)) => data.clone(),
                Ok(NodeLink::Dir(_)) => return Err(BucketError::InvalidPath(path.to_string())),
                Err(e) => return Err(e),
            }
        };
        let chunks = gen_chunks(data, self.chunk_size)?;
        Ok(futures::stream::iter(chunks.map(Ok)).boxed())
    }

    async fn remove_path(
        &self,
        key: &str,
        path: &BucketPath,
        root: Option<BucketRoot>,
    ) -> Result<BucketRoot, BucketError> {
        if path.is_root() {
            return Err(BucketError::InvalidPath(path.to_string()));
        }
        let mut inner = self.inner.write();
        let bucket = bucket_mut(&mut inner, key)?;
        if let Some(expected) = root {
            bucket.check_root(&expected)?;
        }
        bucket.require(&self.principal, &parent_of(path), AccessRole::Admin)?;

        bucket.tree.remove_at_path(path)?;
        bucket.roles.retain(|scope, _| !scope.starts_with(path));
        bucket.advance("remove", path, &[]);
        tracing::debug!("removed {} from {}", path, key);
        Ok(bucket.root.clone())
    }

    async fn remove(&self, key: &str) -> Result<(), BucketError> {
        let mut inner = self.inner.write();
        bucket(&inner, key)?.require(&self.principal, &BucketPath::root(), AccessRole::Admin)?;
        inner.buckets.remove(key);
        tracing::debug!("removed bucket {}", key);
        Ok(())
    }

    async fn push_access_roles(
        &self,
        key: &str,
        path: &BucketPath,
        roles: &AccessRoles,
    ) -> Result<(), BucketError> {
        let mut inner = self.inner.write();
        let bucket = bucket_mut(&mut inner, key)?;
        bucket.require(&self.principal, path, AccessRole::Admin)?;
        if roles.is_empty() {
            bucket.roles.remove(path);
        } else {
            bucket.roles.insert(path.clone(), roles.clone());
        }
        tracing::debug!("set {} roles at {:?} in {}", roles.len(), path.to_string(), key);
        Ok(())
    }

    async fn pull_access_roles(
        &self,
        key: &str,
        path: &BucketPath,
    ) -> Result<AccessRoles, BucketError> {
        let inner = self.inner.read();
        let bucket = bucket(&inner, key)?;
        let role = bucket.role_of(&self.principal, path);
        if role < AccessRole::Reader {
            return Err(BucketError::PermissionDenied(path.to_string()));
        }
        if role < AccessRole::Admin {
            return Ok(AccessRoles::new().with(self.principal.clone(), role));
        }

        // Deeper scopes override shallower ones, principal by principal.
        let mut roles = AccessRoles::new();
        for scope in path.lineage() {
            if let Some(granted) = bucket.roles.get(&scope) {
                for (principal, role) in granted.iter() {
                    roles.insert(principal.clone(), *role);
                }
            }
        }
        roles.insert(bucket.owner.clone(), AccessRole::Admin);
        Ok(roles)
    }

    async fn links(&self, key: &str) -> Result<Links, BucketError> {
        let inner = self.inner.read();
        let bucket = bucket(&inner, key)?;
        if !bucket.can_see(&self.principal, &BucketPath::root()) {
            return Err(BucketError::PermissionDenied(String::new()));
        }
        Ok(bucket.links.clone())
    }
}
