//! Byte sources and chunking
//!
//! - **[`Source`]**: normalizes buffers, readers, files and (possibly
//!   unbounded) streams behind one pull interface, [`ByteSource`]
//! - **[`Chunker`]**: turns a [`Source`] into a lazy sequence of bounded chunks
//! - **[`gen_chunks`]**: the same contract over an in-memory buffer, usable
//!   on its own

mod chunker;
mod source;

pub use chunker::{gen_chunks, Chunker, GenChunks};
pub use source::{ByteSource, FileEntry, Source};

/// Default chunk size for pushes, in bytes
pub const CHUNK_SIZE: usize = 1024;
