use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::bucket::{
    AccessRoles, BucketPath, BucketRoot, CreateOptions, CreateReply, Links, ThreadId,
};
use crate::chunks::{FileEntry, Source, CHUNK_SIZE};
use crate::error::BucketError;
use crate::remote::{PushPathReply, Remote};
use crate::session::{pull, push, tree, ListPathResult, PullOptions, PullPath, PushOptions};

#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Fast-forward precondition for the removal
    pub root: Option<BucketRoot>,
}

impl RemoveOptions {
    pub fn with_root(root: BucketRoot) -> Self {
        Self { root: Some(root) }
    }
}

/// Client for the buckets held by one remote.
///
/// Cheap to clone; clones share the remote but carry their own thread
///  scope.
#[derive(Debug, Clone)]
pub struct Buckets {
    remote: Arc<dyn Remote>,
    thread: Option<ThreadId>,
    chunk_size: usize,
}

impl Buckets {
    pub fn new(remote: impl Remote) -> Self {
        Self::from_arc(Arc::new(remote))
    }

    pub fn from_arc(remote: Arc<dyn Remote>) -> Self {
        Self {
            remote,
            thread: None,
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Scope later calls to a thread
    pub fn with_thread(mut self, thread: ThreadId) -> Self {
        self.thread = Some(thread);
        self
    }

    /// Default chunk size for pushes
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn thread(&self) -> Option<ThreadId> {
        self.thread
    }

    pub fn remote(&self) -> &Arc<dyn Remote> {
        &self.remote
    }

    /// Open the bucket called `name`, creating it if needed. The client
    ///  adopts the bucket's thread when it has none yet.
    pub async fn get_or_create(
        &mut self,
        name: &str,
        opts: CreateOptions,
    ) -> Result<CreateReply, BucketError> {
        let reply = self.remote.open_or_create(self.thread, name, &opts).await?;
        self.thread.get_or_insert(reply.thread_id);
        tracing::info!("opened bucket {} ({})", name, reply.root.key);
        Ok(reply)
    }

    /// Create a new bucket, even if one with the same name exists
    pub async fn create(
        &mut self,
        name: &str,
        opts: CreateOptions,
    ) -> Result<CreateReply, BucketError> {
        let reply = self.remote.create(self.thread, name, &opts).await?;
        self.thread.get_or_insert(reply.thread_id);
        tracing::info!("created bucket {} ({})", name, reply.root.key);
        Ok(reply)
    }

    /// Buckets visible in the current thread scope
    pub async fn list(&self) -> Result<Vec<BucketRoot>, BucketError> {
        self.remote.list_buckets(self.thread).await
    }

    /// Buckets owned by the acting principal, across all threads
    pub async fn existing(&self) -> Result<Vec<BucketRoot>, BucketError> {
        self.remote.list_owned().await
    }

    pub async fn links(&self, key: &str) -> Result<Links, BucketError> {
        self.remote.links(key).await
    }

    /// List `path` with up to `depth` levels below it (default 1)
    pub async fn list_path(
        &self,
        key: &str,
        path: &str,
        depth: Option<u32>,
    ) -> Result<ListPathResult, BucketError> {
        let path = BucketPath::parse(path)?;
        tree::list_path(self.remote.as_ref(), key, &path, depth).await
    }

    /// Every path below `path` (default depth 5), files only unless `dirs`
    pub async fn list_path_flat(
        &self,
        key: &str,
        path: &str,
        dirs: bool,
        depth: Option<u32>,
    ) -> Result<Vec<String>, BucketError> {
        let path = BucketPath::parse(path)?;
        tree::list_path_flat(self.remote.as_ref(), key, &path, dirs, depth).await
    }

    /// Push `source` to `path`, replacing or creating the file there
    pub async fn push_path(
        &self,
        key: &str,
        path: &str,
        source: impl Into<Source>,
        opts: PushOptions,
    ) -> Result<PushPathReply, BucketError> {
        let path = BucketPath::parse_non_root(path)?;
        push::push_path(
            self.remote.as_ref(),
            key,
            &path,
            source.into(),
            opts,
            self.chunk_size,
        )
        .await
    }

    /// Push an in-memory entry to its own path
    pub async fn push_entry(
        &self,
        key: &str,
        entry: FileEntry,
        opts: PushOptions,
    ) -> Result<PushPathReply, BucketError> {
        let path = entry.path.clone();
        self.push_path(key, &path, entry, opts).await
    }

    /// Open a lazy pull of `path`. Nothing is requested until the first
    ///  chunk is asked for.
    pub fn pull_path(
        &self,
        key: &str,
        path: &str,
        opts: PullOptions,
    ) -> Result<PullPath, BucketError> {
        let path = BucketPath::parse_non_root(path)?;
        Ok(pull::PullPath::new(self.remote.clone(), key, path, opts))
    }

    /// Pull `path` into `writer`, returning the number of bytes written
    pub async fn pull_path_to_writer<W>(
        &self,
        key: &str,
        path: &str,
        writer: &mut W,
        opts: PullOptions,
    ) -> Result<u64, BucketError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut pull = self.pull_path(key, path, opts)?;
        while let Some(chunk) = pull.next_chunk().await? {
            writer.write_all(&chunk).await.map_err(BucketError::Sink)?;
        }
        writer.flush().await.map_err(BucketError::Sink)?;
        Ok(pull.received())
    }

    /// Remove a file, or a directory and everything below it
    pub async fn remove_path(
        &self,
        key: &str,
        path: &str,
        opts: RemoveOptions,
    ) -> Result<BucketRoot, BucketError> {
        let path = BucketPath::parse_non_root(path)?;
        let root = self.remote.remove_path(key, &path, opts.root).await?;
        tracing::info!("removed {} from {}", path, key);
        Ok(root)
    }

    /// Delete the whole bucket
    pub async fn remove(&self, key: &str) -> Result<(), BucketError> {
        self.remote.remove(key).await?;
        tracing::info!("removed bucket {}", key);
        Ok(())
    }

    /// Replace the role map at exactly `path`
    pub async fn push_path_access_roles(
        &self,
        key: &str,
        path: &str,
        roles: &AccessRoles,
    ) -> Result<(), BucketError> {
        let path = BucketPath::parse(path)?;
        self.remote.push_access_roles(key, &path, roles).await
    }

    /// Roles at `path`, as much of them as the acting principal may see
    pub async fn pull_path_access_roles(
        &self,
        key: &str,
        path: &str,
    ) -> Result<AccessRoles, BucketError> {
        let path = BucketPath::parse(path)?;
        self.remote.pull_access_roles(key, &path).await
    }
}
