//! Unified error type for the vector-index crate.

use thiserror::Error;

/// Errors produced by the vector index client.
#[derive(Debug, Error)]
pub enum VectorIndexError {
    /// Required environment variable is missing.
    #[error("missing env variable: {key}")]
    EnvMissing { key: String },

    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP/transport error when calling the index.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Index returned a non-successful HTTP status.
    #[error("index HTTP {status}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: reqwest::StatusCode,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// Response payload could not be decoded as expected.
    #[error("decode error: {0}")]
    Decode(String),
}
