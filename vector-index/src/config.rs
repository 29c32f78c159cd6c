//! Index connection settings loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `PINECONE_API_KEY`    = index API key (mandatory)
//! - `PINECONE_INDEX_HOST` = index data-plane URL (mandatory)
//! - `PINECONE_TOP_K`      = default number of matches to return (default 3)

use crate::errors::vector_index_error::VectorIndexError;

const DEFAULT_TOP_K: usize = 3;

/// Connection settings for the hosted vector index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Data-plane URL of the index (e.g., `https://jobs-abc123.svc.pinecone.io`).
    pub host: String,

    /// API key sent in the `Api-Key` header.
    pub api_key: String,

    /// Default top-k for similarity queries.
    pub top_k: usize,
}

fn must_env(key: &str) -> Result<String, VectorIndexError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(VectorIndexError::EnvMissing {
            key: key.to_string(),
        }),
    }
}

impl IndexConfig {
    /// Load the index config from environment variables.
    ///
    /// # Errors
    /// Returns [`VectorIndexError::EnvMissing`] / [`VectorIndexError::EnvParse`]
    /// when required variables are absent or malformed.
    pub fn from_env() -> Result<Self, VectorIndexError> {
        let host = must_env("PINECONE_INDEX_HOST")?;
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(VectorIndexError::InvalidConfig(format!(
                "PINECONE_INDEX_HOST must start with http:// or https:// (got '{host}')"
            )));
        }

        let top_k = match std::env::var("PINECONE_TOP_K") {
            Ok(v) if !v.trim().is_empty() => {
                v.parse::<usize>().map_err(|_| VectorIndexError::EnvParse {
                    key: "PINECONE_TOP_K".to_string(),
                    value: v,
                })?
            }
            _ => DEFAULT_TOP_K,
        };

        Ok(Self {
            host,
            api_key: must_env("PINECONE_API_KEY")?,
            top_k,
        })
    }
}
