//! The bucket service, as seen from the client
//!
//! - **[`Remote`]**: the call interface sessions are driven against
//! - **[`MemoryRemote`]**: a complete in-memory service, used by the test
//!   suite and for trying things out without a server

mod memory;
mod node;
mod provider;

pub use memory::{MemoryRemote, DEFAULT_THREAD, SEED_NAME};
pub use node::{Node, NodeLink};
pub use provider::{ChunkStream, ListPathReply, PushPathReply, Remote};
