use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::StreamExt;

use super::source::Source;
use crate::error::BucketError;

/// Split an in-memory buffer into chunks of at most `size` bytes.
///
/// Every chunk but the last is exactly `size` bytes long; an empty buffer
///  yields no chunks. Chunks are zero-copy slices of `data`.
pub fn gen_chunks(data: impl Into<Bytes>, size: usize) -> Result<GenChunks, BucketError> {
    if size == 0 {
        return Err(BucketError::InvalidChunkSize);
    }
    Ok(GenChunks {
        data: data.into(),
        size,
    })
}

#[derive(Debug, Clone)]
pub struct GenChunks {
    data: Bytes,
    size: usize,
}

impl Iterator for GenChunks {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        let at = self.size.min(self.data.len());
        Some(self.data.split_to(at))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.data.len().div_ceil(self.size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for GenChunks {}

/// Re-chunks a [`Source`] into a lazy sequence of chunks of at most
///  `size` bytes, coalescing short reads and splitting long ones.
///
/// Every chunk except the last of a finite source is exactly `size` bytes.
///  Nothing is buffered beyond one chunk, so unbounded sources are fine.
#[derive(Debug)]
pub struct Chunker {
    source: Source,
    size: usize,
    buf: BytesMut,
    exhausted: bool,
    failed: bool,
}

impl Chunker {
    pub fn new(source: Source, size: usize) -> Result<Self, BucketError> {
        if size == 0 {
            return Err(BucketError::InvalidChunkSize);
        }
        Ok(Self {
            source,
            size,
            buf: BytesMut::new(),
            exhausted: false,
            failed: false,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.size
    }

    /// Pull the next chunk, or `None` once the source is drained.
    ///  A source read error is returned here, after which the chunker
    ///  yields nothing more.
    pub async fn next_chunk(&mut self) -> std::io::Result<Option<Bytes>> {
        if self.failed {
            return Ok(None);
        }
        loop {
            if self.buf.len() >= self.size {
                return Ok(Some(self.buf.split_to(self.size).freeze()));
            }
            if self.exhausted {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.buf.split().freeze()));
            }
            match self.source.pull().await {
                Ok(Some(bytes)) => {
                    // pass exact-size reads straight through
                    if self.buf.is_empty() && bytes.len() == self.size {
                        return Ok(Some(bytes));
                    }
                    self.buf.extend_from_slice(&bytes);
                }
                Ok(None) => self.exhausted = true,
                Err(err) => {
                    self.failed = true;
                    return Err(err);
                }
            }
        }
    }

    pub fn into_stream(self) -> BoxStream<'static, std::io::Result<Bytes>> {
        futures::stream::unfold(self, |mut chunker| async move {
            match chunker.next_chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), chunker)),
                Ok(None) => None,
                Err(err) => Some((Err(err), chunker)),
            }
        })
        .boxed()
    }
}
