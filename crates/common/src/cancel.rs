//! Single-shot abort handle for in-flight pushes and pulls.
//!
//! Sessions only look at the signal at chunk boundaries: a chunk that is
//!  already in flight when [`CancelSignal::abort`] is called completes, and
//!  the session then stops with [`BucketError::Aborted`]. Aborting after a
//!  session has finished does nothing.

use tokio_util::sync::CancellationToken;

use crate::error::BucketError;

#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Transition the signal to aborted. Idempotent.
    pub fn abort(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("cancel signal fired");
        }
        self.token.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has been aborted
    pub async fn aborted(&self) {
        self.token.cancelled().await
    }

    /// Chunk-boundary check used by the transfer loops
    pub fn check(&self) -> Result<(), BucketError> {
        if self.is_aborted() {
            Err(BucketError::Aborted)
        } else {
            Ok(())
        }
    }
}

impl From<CancellationToken> for CancelSignal {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}

/// Wait on an optional signal. With no signal bound this never resolves.
pub(crate) async fn wait_aborted(signal: Option<&CancelSignal>) {
    match signal {
        Some(signal) => signal.aborted().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_transitions_once() {
        let signal = CancelSignal::new();
        assert!(signal.check().is_ok());
        signal.abort();
        signal.abort();
        assert!(signal.is_aborted());
        assert!(signal.check().unwrap_err().is_aborted());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let signal = CancelSignal::new();
        let other = signal.clone();
        tokio::spawn(async move { other.abort() });
        signal.aborted().await;
        assert!(signal.is_aborted());
    }
}
