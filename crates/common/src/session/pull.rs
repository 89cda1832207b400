use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures::stream::{FusedStream, Stream};
use futures::{StreamExt, TryStreamExt};

use super::Progress;
use crate::bucket::BucketPath;
use crate::cancel::CancelSignal;
use crate::error::BucketError;
use crate::remote::{ChunkStream, Remote};

#[derive(Clone, Default)]
pub struct PullOptions {
    /// Called with the cumulative byte count after each chunk is yielded
    pub progress: Option<Progress>,
    pub signal: Option<CancelSignal>,
}

impl PullOptions {
    pub fn with_progress(mut self, progress: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn with_signal(mut self, signal: CancelSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

impl fmt::Debug for PullOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullOptions")
            .field("progress", &self.progress.is_some())
            .field("signal", &self.signal)
            .finish()
    }
}

/// A lazy chunk sequence over a file in a bucket.
///
/// Nothing is requested from the remote until the first advancement, so
///  a missing path surfaces as `NotFound` there. After any error, or once
///  the signal has fired and been reported, the sequence is over.
pub struct PullPath {
    key: String,
    path: BucketPath,
    chunks: ChunkStream,
    aborted: Option<Pin<Box<dyn Future<Output = ()> + Send>>>,
    signal: Option<CancelSignal>,
    progress: Option<Progress>,
    received: u64,
    done: bool,
}

impl PullPath {
    pub(crate) fn new(
        remote: Arc<dyn Remote>,
        key: &str,
        path: BucketPath,
        opts: PullOptions,
    ) -> Self {
        let chunks = {
            let key = key.to_string();
            let path = path.clone();
            futures::stream::once(async move { remote.pull_path(&key, &path).await })
                .try_flatten()
                .boxed()
        };
        let aborted = opts.signal.clone().map(|signal| {
            Box::pin(async move { signal.aborted().await })
                as Pin<Box<dyn Future<Output = ()> + Send>>
        });

        Self {
            key: key.to_string(),
            path,
            chunks,
            aborted,
            signal: opts.signal,
            progress: opts.progress,
            received: 0,
            done: false,
        }
    }

    /// Bytes yielded so far
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Advance by one chunk. `Ok(None)` marks the end of the file.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, BucketError> {
        self.next().await.transpose()
    }

    /// Drain the rest of the file into memory
    pub async fn read_to_end(mut self) -> Result<Vec<u8>, BucketError> {
        let mut out = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }

    fn finish(&mut self, err: BucketError) -> Poll<Option<Result<Bytes, BucketError>>> {
        self.done = true;
        let aborted = self.signal.as_ref().is_some_and(CancelSignal::is_aborted);
        if err.is_aborted() || aborted {
            tracing::warn!("pull of {} from {} aborted", self.path, self.key);
            return Poll::Ready(Some(Err(BucketError::Aborted)));
        }
        Poll::Ready(Some(Err(err)))
    }
}

impl Stream for PullPath {
    type Item = Result<Bytes, BucketError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        if let Some(aborted) = this.aborted.as_mut() {
            if aborted.as_mut().poll(cx).is_ready() {
                return this.finish(BucketError::Aborted);
            }
        }

        match ready!(this.chunks.poll_next_unpin(cx)) {
            Some(Ok(chunk)) => {
                this.received += chunk.len() as u64;
                tracing::debug!("received chunk of {} bytes ({} total)", chunk.len(), this.received);
                if let Some(progress) = &this.progress {
                    progress(this.received);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Err(err)) => this.finish(err),
            None => {
                this.done = true;
                tracing::info!("pulled {} bytes from {} in {}", this.received, this.path, this.key);
                Poll::Ready(None)
            }
        }
    }
}

impl FusedStream for PullPath {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl fmt::Debug for PullPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullPath")
            .field("key", &self.key)
            .field("path", &self.path)
            .field("received", &self.received)
            .field("done", &self.done)
            .finish()
    }
}
