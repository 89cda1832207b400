use common::error::{BucketError, NON_FAST_FORWARD};
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
}

impl From<ApiError> for BucketError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::HttpStatus(status, body) => match status {
                StatusCode::NOT_FOUND => BucketError::NotFound(body),
                StatusCode::CONFLICT => BucketError::NonFastForward,
                StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                    BucketError::PermissionDenied(body)
                }
                StatusCode::BAD_REQUEST | StatusCode::PRECONDITION_FAILED
                    if body.contains(NON_FAST_FORWARD) =>
                {
                    BucketError::NonFastForward
                }
                StatusCode::GONE => BucketError::BucketNotFound(body),
                _ => BucketError::Transport(format!("HTTP status {}: {}", status, body)),
            },
            other => BucketError::Transport(other.to_string()),
        }
    }
}
