use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::bucket::{
    AccessRoles, BucketPath, BucketRoot, CreateOptions, CreateReply, Links, PathEntry, ThreadId,
};
use crate::error::BucketError;

/// A stream of chunks moving to or from a remote
pub type ChunkStream = BoxStream<'static, Result<Bytes, BucketError>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPathReply {
    /// Root as observed when the listing was taken
    pub root: BucketRoot,
    /// Flat, depth-limited rows; the first is the listed item itself
    pub entries: Vec<PathEntry>,
}

/// Final acknowledgement of a push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPathReply {
    pub root: BucketRoot,
    /// Path of the written item, relative to the bucket root
    pub path: String,
    pub size: u64,
}

/// The calls this crate makes against a bucket service.
///
/// Implementations own transport, session and wire format. They enforce
///  storage invariants themselves: fast-forward checks, roles, and atomic
///  writes all happen on the far side of this trait.
///
/// Errors must use the [`BucketError`] taxonomy: `NonFastForward` for a
///  failed precondition, `PermissionDenied` for a missing role, `NotFound`
///  (naming the missing segment) for missing paths. Anything else should be
///  `Transport`.
#[async_trait]
pub trait Remote: Send + Sync + std::fmt::Debug + 'static {
    /// Open the bucket called `name` in the thread scope, creating it if it
    ///  does not exist
    async fn open_or_create(
        &self,
        thread: Option<ThreadId>,
        name: &str,
        opts: &CreateOptions,
    ) -> Result<CreateReply, BucketError>;

    /// Create a new bucket, even if one with the same name exists
    async fn create(
        &self,
        thread: Option<ThreadId>,
        name: &str,
        opts: &CreateOptions,
    ) -> Result<CreateReply, BucketError>;

    /// Roots of buckets visible to the caller, optionally within one thread
    async fn list_buckets(&self, thread: Option<ThreadId>)
        -> Result<Vec<BucketRoot>, BucketError>;

    /// Roots of buckets owned by the caller, across all threads
    async fn list_owned(&self) -> Result<Vec<BucketRoot>, BucketError>;

    /// List `path` and up to `depth` levels below it
    async fn list_path(
        &self,
        key: &str,
        path: &BucketPath,
        depth: u32,
    ) -> Result<ListPathReply, BucketError>;

    /// Write the chunks to `path` as one atomic update.
    ///
    /// `root` is the fast-forward precondition; with `None` the remote uses
    ///  the root it sees when the call starts. If `chunks` yields an error
    ///  the remote must abandon the write and return that error.
    async fn push_path(
        &self,
        key: &str,
        path: &BucketPath,
        root: Option<BucketRoot>,
        chunks: ChunkStream,
    ) -> Result<PushPathReply, BucketError>;

    /// Open a chunk stream over the file at `path`
    async fn pull_path(&self, key: &str, path: &BucketPath) -> Result<ChunkStream, BucketError>;

    /// Remove `path` and everything below it, returning the new root
    async fn remove_path(
        &self,
        key: &str,
        path: &BucketPath,
        root: Option<BucketRoot>,
    ) -> Result<BucketRoot, BucketError>;

    /// Delete the whole bucket
    async fn remove(&self, key: &str) -> Result<(), BucketError>;

    /// Replace the role map at exactly `path`
    async fn push_access_roles(
        &self,
        key: &str,
        path: &BucketPath,
        roles: &AccessRoles,
    ) -> Result<(), BucketError>;

    /// Role map at `path`, as much of it as the caller may see
    async fn pull_access_roles(
        &self,
        key: &str,
        path: &BucketPath,
    ) -> Result<AccessRoles, BucketError>;

    async fn links(&self, key: &str) -> Result<Links, BucketError>;
}
