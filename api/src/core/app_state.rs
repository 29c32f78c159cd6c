use llm_service::LlmServiceProfiles;
use vector_index::{IndexConfig, PineconeIndex};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Provider clients for chat, classification, and embeddings.
    pub llm: LlmServiceProfiles,
    /// Client for the hosted job index.
    pub index: PineconeIndex,
}

impl AppState {
    /// Load shared state from environment variables.
    ///
    /// Fails fast at boot when a provider key or index host is missing, so
    /// misconfiguration never surfaces as per-request 500s later.
    pub fn from_env() -> Result<Self, AppError> {
        let llm = LlmServiceProfiles::from_env()?;
        let index = PineconeIndex::new(IndexConfig::from_env()?)?;

        Ok(Self { llm, index })
    }
}
