//! Top-level error type shared by jobs, apply planners and handlers.

use axum::http::StatusCode;
use thiserror::Error;

use crate::cms::StoreError;
use crate::llm::GenerationError;

/// Worker error type.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Missing or malformed input.
    #[error("{0}")]
    BadRequest(String),
    /// Referenced document does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The document has no preview of the requested kind.
    #[error("{0}")]
    NoPreview(String),
    /// Every candidate was empty after normalization.
    #[error("{0}")]
    NothingToApply(String),
    /// Event name with no registered job.
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    /// Document store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// Generation provider failure that was not absorbed by a fallback.
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    /// Event could not be handed to the event system.
    #[error("event dispatch failed: {0}")]
    Dispatch(String),
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// URL parse error.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl WorkerError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::NoPreview(_)
            | Self::NothingToApply(_)
            | Self::UnknownEvent(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::Store(StoreError::DocumentMissing(_)) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Missing `docId` (or one that is only the draft prefix).
    #[must_use]
    pub fn missing_doc_id() -> Self {
        Self::BadRequest("Missing docId".to_string())
    }
}

/// Convenience result alias.
pub type WorkerResult<T> = Result<T, WorkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(WorkerError::missing_doc_id().status(), StatusCode::BAD_REQUEST);
        assert_eq!(WorkerError::NoPreview("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(WorkerError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            WorkerError::from(StoreError::DocumentMissing("p1".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WorkerError::Dispatch("down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
