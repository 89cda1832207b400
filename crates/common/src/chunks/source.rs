use std::path::Path;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::CHUNK_SIZE;

/// Pull-based byte source. Each call returns the next run of bytes in
///  source order (of any length), or `None` once the source is exhausted.
///  Read failures are returned to the caller of the pull that hit them.
#[async_trait]
pub trait ByteSource: Send {
    async fn pull(&mut self) -> std::io::Result<Option<Bytes>>;
}

/// A single in-memory file, addressed by its own path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub content: Bytes,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

// Adapters. Which one backs a `Source` is decided by the constructor,
//  never by inspecting the input at runtime.

struct BufferSource(Option<Bytes>);

#[async_trait]
impl ByteSource for BufferSource {
    async fn pull(&mut self) -> std::io::Result<Option<Bytes>> {
        Ok(self.0.take().filter(|bytes| !bytes.is_empty()))
    }
}

struct ReaderSource<R> {
    reader: R,
    read_size: usize,
}

#[async_trait]
impl<R> ByteSource for ReaderSource<R>
where
    R: AsyncRead + Send + Unpin,
{
    async fn pull(&mut self) -> std::io::Result<Option<Bytes>> {
        let mut buf = BytesMut::with_capacity(self.read_size);
        let n = self.reader.read_buf(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf.freeze()))
    }
}

struct StreamSource(BoxStream<'static, std::io::Result<Bytes>>);

#[async_trait]
impl ByteSource for StreamSource {
    async fn pull(&mut self) -> std::io::Result<Option<Bytes>> {
        self.0.next().await.transpose()
    }
}

/// A byte source normalized behind [`ByteSource`]. Nothing is read until
///  the first pull, and unbounded sources are never materialized.
pub struct Source {
    inner: Box<dyn ByteSource>,
    entry_path: Option<String>,
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("entry_path", &self.entry_path)
            .finish_non_exhaustive()
    }
}

impl Source {
    /// Wrap any custom [`ByteSource`]
    pub fn new(source: impl ByteSource + 'static) -> Self {
        Self {
            inner: Box::new(source),
            entry_path: None,
        }
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(BufferSource(Some(bytes.into())))
    }

    /// A structured in-memory file. The entry keeps its path so it can be
    ///  pushed without naming a destination.
    pub fn from_entry(entry: FileEntry) -> Self {
        let mut source = Self::from_bytes(entry.content);
        source.entry_path = Some(entry.path);
        source
    }

    /// Any async reader, read `CHUNK_SIZE` bytes at a time
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self::from_reader_with_size(reader, CHUNK_SIZE)
    }

    pub fn from_reader_with_size<R>(reader: R, read_size: usize) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self::new(ReaderSource {
            reader,
            read_size: read_size.max(1),
        })
    }

    /// Open a file on disk. The file is streamed, not loaded.
    pub async fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = tokio::fs::File::open(path.as_ref()).await?;
        Ok(Self::from_reader(file))
    }

    /// A stream of byte runs. May be unbounded.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        Self::new(StreamSource(stream.boxed()))
    }

    /// Path carried by a source built with [`Source::from_entry`]
    pub fn entry_path(&self) -> Option<&str> {
        self.entry_path.as_deref()
    }

    pub async fn pull(&mut self) -> std::io::Result<Option<Bytes>> {
        self.inner.pull().await
    }
}

impl From<Bytes> for Source {
    fn from(bytes: Bytes) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&'static [u8]> for Source {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_bytes(Bytes::from_static(bytes))
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Self::from_bytes(text)
    }
}

impl From<FileEntry> for Source {
    fn from(entry: FileEntry) -> Self {
        Self::from_entry(entry)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    async fn drain(mut source: Source) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(bytes) = source.pull().await? {
            out.extend_from_slice(&bytes);
        }
        Ok(out)
    }

    #[tokio::test]
    async fn test_buffer_source() {
        let source = Source::from(b"some content".to_vec());
        assert_eq!(drain(source).await.unwrap(), b"some content");

        let mut empty = Source::from_bytes(Bytes::new());
        assert!(empty.pull().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entry_keeps_path() {
        let source = Source::from(FileEntry::new("/index.html", "<html/>"));
        assert_eq!(source.entry_path(), Some("/index.html"));
        assert_eq!(drain(source).await.unwrap(), b"<html/>");
    }

    #[tokio::test]
    async fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        file.write_all(&data).unwrap();

        let source = Source::from_file(file.path()).await.unwrap();
        assert_eq!(drain(source).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_stream_error_surfaces_on_pull() {
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"data")),
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone")),
        ]);
        let mut source = Source::from_stream(stream);
        assert_eq!(source.pull().await.unwrap().unwrap(), "data");
        let err = source.pull().await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_unbounded_stream_is_lazy() {
        let stream = futures::stream::repeat_with(|| Ok(Bytes::from_static(b"data")));
        let mut source = Source::from_stream(stream);
        for _ in 0..3 {
            assert_eq!(source.pull().await.unwrap().unwrap().len(), 4);
        }
    }
}
