/**
 * The bucket data model: roots, items,
 *  paths and access roles.
 */
pub mod bucket;
/**
 * Single-shot abort handle, shared between
 *  whoever starts a transfer and the transfer itself.
 */
pub mod cancel;
/**
 * Byte sources of every shape, and the chunker
 *  that turns them into bounded pieces.
 */
pub mod chunks;
/**
 * The caller-facing surface: one handle
 *  for every bucket operation.
 */
pub mod client;
pub mod error;
/**
 * The call interface a bucket service offers,
 *  plus an in-memory service implementing it.
 */
pub mod remote;
/**
 * Push, pull and listing sessions.
 *  Each one drives a single transfer or listing
 *  against a remote.
 */
pub mod session;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::bucket::{
        AccessRole, AccessRoles, BucketItem, BucketPath, BucketRoot, CreateOptions, CreateReply,
        Links, ThreadId,
    };
    pub use crate::cancel::CancelSignal;
    pub use crate::chunks::{gen_chunks, FileEntry, Source, CHUNK_SIZE};
    pub use crate::client::{Buckets, RemoveOptions};
    pub use crate::error::{BucketError, NON_FAST_FORWARD};
    pub use crate::remote::{MemoryRemote, PushPathReply, Remote};
    pub use crate::session::{ListPathResult, PullOptions, PullPath, PushOptions};
    pub use crate::version::build_info;
}
