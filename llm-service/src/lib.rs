//! Client library for the hosted LLM provider (Cohere v2 REST API).
//!
//! Three operations, matching what the backend relays:
//! - streaming chat (`/v2/chat` with `stream: true`) parsed into typed events
//! - non-streaming chat with a structured JSON response format
//! - query embeddings (`/v2/embed`)
//!
//! Construct [`service_profiles::LlmServiceProfiles`] once from environment
//! variables, wrap it in `Arc`, and pass clones to dependents.

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;

pub use error_handler::LlmError;
pub use service_profiles::LlmServiceProfiles;
pub use services::cohere_service::{
    ChatEventStream, ChatMessage, ChatStreamEvent, Citation, CohereService, Document,
};
