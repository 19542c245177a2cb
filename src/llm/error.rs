//! Error types for the generation client.

use thiserror::Error;

/// Errors that can occur while generating structured output.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The provider returned no text.
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// The returned text is not JSON of the requested shape.
    #[error("malformed output: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// JSON parsed but failed validation.
    #[error("invalid output: {0}")]
    Invalid(String),
}
