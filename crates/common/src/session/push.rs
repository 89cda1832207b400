use std::fmt;

use futures::StreamExt;

use super::Progress;
use crate::bucket::{BucketPath, BucketRoot};
use crate::cancel::{wait_aborted, CancelSignal};
use crate::chunks::{Chunker, Source};
use crate::error::BucketError;
use crate::remote::{ChunkStream, PushPathReply, Remote};

#[derive(Clone, Default)]
pub struct PushOptions {
    /// Fast-forward precondition. Without it the remote compares against
    ///  whatever root it sees when the push starts.
    pub root: Option<BucketRoot>,
    /// Called with the cumulative byte count after each chunk is sent
    pub progress: Option<Progress>,
    pub signal: Option<CancelSignal>,
    /// Overrides the client's chunk size for this push
    pub chunk_size: Option<usize>,
}

impl PushOptions {
    pub fn with_root(mut self, root: BucketRoot) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.progress = Some(std::sync::Arc::new(progress));
        self
    }

    pub fn with_signal(mut self, signal: CancelSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }
}

impl fmt::Debug for PushOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushOptions")
            .field("root", &self.root)
            .field("progress", &self.progress.is_some())
            .field("signal", &self.signal)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

struct Outgoing {
    chunker: Chunker,
    sent: u64,
    progress: Option<Progress>,
    signal: Option<CancelSignal>,
}

/// The chunk stream handed to the remote. The signal is checked before
///  each chunk goes out; once it fires the stream ends with `Aborted`.
///  Every chunk is a suspension point, even for sources that are always
///  ready.
fn outgoing(state: Outgoing) -> ChunkStream {
    futures::stream::unfold(Some(state), |state| async move {
        let mut state = state?;
        tokio::task::yield_now().await;
        match state.chunker.next_chunk().await {
            Ok(Some(chunk)) => {
                if let Some(signal) = &state.signal {
                    if let Err(err) = signal.check() {
                        return Some((Err(err), None));
                    }
                }
                state.sent += chunk.len() as u64;
                tracing::debug!("sending chunk of {} bytes ({} total)", chunk.len(), state.sent);
                if let Some(progress) = &state.progress {
                    progress(state.sent);
                }
                Some((Ok(chunk), Some(state)))
            }
            Ok(None) => None,
            Err(err) => Some((Err(BucketError::Source(err)), None)),
        }
    })
    .boxed()
}

/// Drive one push to completion.
///
/// The remote call races the signal, so a push stuck waiting on its
///  source still terminates once the signal fires. Whatever the remote
///  reports after the signal fired, the caller sees `Aborted`.
pub(crate) async fn push_path(
    remote: &dyn Remote,
    key: &str,
    path: &BucketPath,
    source: Source,
    opts: PushOptions,
    default_chunk_size: usize,
) -> Result<PushPathReply, BucketError> {
    let PushOptions {
        root,
        progress,
        signal,
        chunk_size,
    } = opts;

    if let Some(signal) = &signal {
        signal.check()?;
    }

    let chunker = Chunker::new(source, chunk_size.unwrap_or(default_chunk_size))?;
    let chunks = outgoing(Outgoing {
        chunker,
        sent: 0,
        progress,
        signal: signal.clone(),
    });

    let result = tokio::select! {
        biased;
        _ = wait_aborted(signal.as_ref()) => Err(BucketError::Aborted),
        reply = remote.push_path(key, path, root, chunks) => reply,
    };

    match result {
        Ok(reply) => {
            tracing::info!("pushed {} bytes to {} in {}", reply.size, reply.path, key);
            Ok(reply)
        }
        Err(_) if signal.as_ref().is_some_and(CancelSignal::is_aborted) => {
            tracing::warn!("push to {} in {} aborted", path, key);
            Err(BucketError::Aborted)
        }
        Err(err) => Err(err),
    }
}
