//! Vector index I/O: top-k similarity queries over the REST data plane.
//!
//! This module does **not** compute embeddings — only index I/O. The query
//! vector comes from the LLM provider's embedding endpoint upstream.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::IndexConfig;
use crate::errors::vector_index_error::VectorIndexError;
use crate::structs::query_match::QueryMatch;

/// Thin client for a Pinecone-style index data plane.
#[derive(Debug)]
pub struct PineconeIndex {
    client: reqwest::Client,
    cfg: IndexConfig,
    url_query: String,
}

/// Request body for `POST {host}/query`. The index API expects camelCase.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
}

/// Response body for `POST {host}/query`.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

impl PineconeIndex {
    /// Creates a new index client from the given config.
    ///
    /// # Errors
    /// Returns [`VectorIndexError::Transport`] if the HTTP client cannot be
    /// built, or [`VectorIndexError::InvalidConfig`] for a malformed API key.
    pub fn new(cfg: IndexConfig) -> Result<Self, VectorIndexError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "Api-Key",
            header::HeaderValue::from_str(&cfg.api_key).map_err(|e| {
                VectorIndexError::InvalidConfig(format!("invalid API key header: {e}"))
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        let url_query = format!("{}/query", cfg.host.trim_end_matches('/'));

        Ok(Self {
            client,
            cfg,
            url_query,
        })
    }

    /// Runs a k-NN query for a **query vector** and returns ranked matches
    /// with their stored metadata.
    ///
    /// `k` overrides the configured default top-k when provided.
    ///
    /// # Errors
    /// - [`VectorIndexError::HttpStatus`] for non-2xx responses
    /// - [`VectorIndexError::Transport`] for client/network failures
    /// - [`VectorIndexError::Decode`] if the JSON cannot be parsed
    pub async fn query_top_k(
        &self,
        vector: Vec<f32>,
        k: Option<usize>,
    ) -> Result<Vec<QueryMatch>, VectorIndexError> {
        let started = Instant::now();
        let top_k = k.unwrap_or(self.cfg.top_k);
        let body = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        debug!(top_k, dim = body.vector.len(), "POST {}", self.url_query);

        let resp = self.client.post(&self.url_query).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let snippet = resp.text().await.unwrap_or_default();

            error!(
                %status,
                snippet = %snippet.trim(),
                latency_ms = started.elapsed().as_millis(),
                "index query returned non-success status"
            );

            return Err(VectorIndexError::HttpStatus {
                status,
                snippet: snippet.trim().to_string(),
            });
        }

        let out: QueryResponse = resp.json().await.map_err(|e| {
            VectorIndexError::Decode(format!("serde error: {e}; expected `matches` array"))
        })?;

        info!(
            hits = out.matches.len(),
            latency_ms = started.elapsed().as_millis(),
            "index query completed"
        );

        Ok(out.matches)
    }
}
