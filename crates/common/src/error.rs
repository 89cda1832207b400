//! Errors surfaced by bucket operations.

/// Message carried by [`BucketError::NonFastForward`]. Remotes report
///  conflicts with exactly this text, so keep it stable.
pub const NON_FAST_FORWARD: &str = "update is non-fast-forward";

#[derive(Debug, thiserror::Error)]
pub enum BucketError {
    /// The requested path (or one of its segments) does not exist
    #[error("{0}")]
    NotFound(String),
    /// The root precondition no longer matches the bucket's current root
    #[error("update is non-fast-forward")]
    NonFastForward,
    /// The acting principal lacks the required role at a path
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// A bound cancel signal fired. Transports that report interruption in
    ///  their own way are normalized to this variant.
    #[error("the operation was aborted")]
    Aborted,
    /// The byte source failed while being read
    #[error("source read error: {0}")]
    Source(#[from] std::io::Error),
    /// Writing pulled content to its destination failed
    #[error("write error: {0}")]
    Sink(std::io::Error),
    #[error("invalid path: {0:?}")]
    InvalidPath(String),
    #[error("invalid depth: {0} (must be at least 1)")]
    InvalidDepth(u32),
    #[error("invalid chunk size: must be greater than zero")]
    InvalidChunkSize,
    #[error("bucket not found: {0}")]
    BucketNotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl BucketError {
    /// Whether this is the cancellation sentinel
    pub fn is_aborted(&self) -> bool {
        matches!(self, BucketError::Aborted)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BucketError::NotFound(_) | BucketError::BucketNotFound(_))
    }

    pub fn is_non_fast_forward(&self) -> bool {
        matches!(self, BucketError::NonFastForward)
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, BucketError::PermissionDenied(_))
    }

    /// Build the not-found error for a missing path segment
    pub fn no_link(segment: &str, under: &str) -> Self {
        if under.is_empty() {
            BucketError::NotFound(format!("no link named {:?} under bucket root", segment))
        } else {
            BucketError::NotFound(format!("no link named {:?} under {}", segment, under))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(BucketError::NonFastForward.to_string(), NON_FAST_FORWARD);
        assert!(BucketError::PermissionDenied("path/to".into())
            .to_string()
            .contains("permission denied"));
        let err = BucketError::no_link("nope.jpg", "dir1");
        assert!(err.to_string().contains("nope.jpg"));
        assert!(err.to_string().contains("no link named"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_aborted_is_distinct() {
        assert!(BucketError::Aborted.is_aborted());
        let io = std::io::Error::new(std::io::ErrorKind::Interrupted, "interrupted");
        assert!(!BucketError::from(io).is_aborted());
        assert!(!BucketError::Transport("aborted".into()).is_aborted());
    }
}
