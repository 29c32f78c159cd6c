//! Shared LLM service with three active profiles: `chat`, `classifier`,
//! and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Each profile owns its preconfigured HTTP client.

use serde_json::Value;

use crate::{
    config::{
        default_config::{config_cohere_chat, config_cohere_classifier, config_cohere_embedding},
        llm_model_config::LlmModelConfig,
    },
    error_handler::LlmError,
    services::cohere_service::{ChatEventStream, ChatMessage, CohereService, Document},
};

/// Shared service that manages three logical LLM profiles:
/// **chat**, **classifier**, and **embedding**.
pub struct LlmServiceProfiles {
    chat: CohereService,
    classifier: CohereService,
    embedding: CohereService,
}

impl LlmServiceProfiles {
    /// Creates a new service from three explicit profile configs.
    ///
    /// # Errors
    /// Returns [`LlmError`] if any profile config fails validation.
    pub fn new(
        chat: LlmModelConfig,
        classifier: LlmModelConfig,
        embedding: LlmModelConfig,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            chat: CohereService::new(chat)?,
            classifier: CohereService::new(classifier)?,
            embedding: CohereService::new(embedding)?,
        })
    }

    /// Creates the service with all three profiles loaded from environment
    /// variables (see `config::default_config`).
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(
            config_cohere_chat()?,
            config_cohere_classifier()?,
            config_cohere_embedding()?,
        )
    }

    /// Streams a chat completion using the **chat** profile.
    ///
    /// # Errors
    /// Returns [`LlmError`] if the stream cannot be started.
    pub async fn chat_stream(
        &self,
        messages: Vec<ChatMessage>,
        documents: Vec<Document>,
    ) -> Result<ChatEventStream, LlmError> {
        self.chat.chat_stream(messages, documents).await
    }

    /// Runs a structured-JSON chat call using the **classifier** profile
    /// and returns the raw JSON text produced by the model.
    ///
    /// # Errors
    /// Returns [`LlmError`] if the call or decoding fails.
    pub async fn classify_json(
        &self,
        system: &str,
        user: &str,
        schema: Value,
    ) -> Result<String, LlmError> {
        self.classifier.chat_json(system, user, schema).await
    }

    /// Computes a search-query embedding using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`LlmError`] if embedding fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        self.embedding.embed_query(input).await
    }
}
