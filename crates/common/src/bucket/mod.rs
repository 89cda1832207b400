//! Bucket data model
//!
//! - **[`BucketRoot`]**: a version of a bucket, used as the optimistic
//!   concurrency precondition for mutations
//! - **[`BucketItem`]**: a node of the file tree, rebuilt fresh on every listing
//! - **[`AccessRoles`]**: principal -> [`AccessRole`] mapping scoped to a path
//! - **[`BucketPath`]**: validated slash-separated path within a bucket

mod item;
mod path;
mod roles;
mod root;

pub use item::{BucketItem, PathEntry};
pub use path::BucketPath;
pub use roles::{AccessRole, AccessRoles, UnknownRole};
pub use root::{BucketRoot, CreateOptions, CreateReply, Links, ThreadId};
