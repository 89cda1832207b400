//! Transfers and listings against a [`Remote`](crate::remote::Remote)
//!
//! - **push**: chunked upload of one path, with progress and cancellation
//! - **pull**: lazy chunked download of one path
//! - **tree**: depth-limited listing, rebuilt into a [`BucketItem`](crate::bucket::BucketItem) tree

pub(crate) mod pull;
pub(crate) mod push;
pub(crate) mod tree;

use std::sync::Arc;

pub use pull::{PullOptions, PullPath};
pub use push::PushOptions;
pub use tree::{build_tree, flatten, ListPathResult, DEFAULT_FLAT_DEPTH, DEFAULT_LIST_DEPTH};

/// Progress callback, called with the cumulative number of bytes moved
pub type Progress = Arc<dyn Fn(u64) + Send + Sync>;
