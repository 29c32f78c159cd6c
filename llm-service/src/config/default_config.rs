//! Default LLM configs loaded strictly from environment variables.
//!
//! Convenience constructors for [`LlmModelConfig`], one per role:
//!
//! - **Chat**       → streaming conversational answers (temperature 0.3)
//! - **Classifier** → routing decisions with structured JSON output (0.1)
//! - **Embedding**  → query vectors for similarity search
//!
//! # Environment variables
//!
//! - `COHERE_API_KEY`     = provider API key (mandatory)
//! - `COHERE_API_URL`     = API base URL (default `https://api.cohere.com`)
//! - `COHERE_CHAT_MODEL`  = chat/classifier model (default `command-r-plus`)
//! - `COHERE_EMBED_MODEL` = embedding model (default `embed-english-v3.0`)
//! - `LLM_TIMEOUT_SECS`   = optional request timeout (u64)

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{LlmError, env_opt_u64, must_env, validate_http_endpoint},
};

const DEFAULT_ENDPOINT: &str = "https://api.cohere.com";
const DEFAULT_CHAT_MODEL: &str = "command-r-plus";
const DEFAULT_EMBED_MODEL: &str = "embed-english-v3.0";

/// Resolves the provider endpoint, falling back to the hosted API URL.
fn cohere_endpoint() -> Result<String, LlmError> {
    let url = std::env::var("COHERE_API_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    validate_http_endpoint("COHERE_API_URL", &url)?;
    Ok(url)
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Constructs the config for the **chat** profile used by the stream relay.
///
/// # Errors
/// Fails when `COHERE_API_KEY` is missing or the endpoint is malformed.
pub fn config_cohere_chat() -> Result<LlmModelConfig, LlmError> {
    Ok(LlmModelConfig {
        model: env_or("COHERE_CHAT_MODEL", DEFAULT_CHAT_MODEL),
        endpoint: cohere_endpoint()?,
        api_key: must_env("COHERE_API_KEY")?,
        temperature: Some(0.3),
        timeout_secs: env_opt_u64("LLM_TIMEOUT_SECS")?,
    })
}

/// Constructs the config for the **classifier** profile.
///
/// Low temperature keeps the routing decision stable for a given query.
pub fn config_cohere_classifier() -> Result<LlmModelConfig, LlmError> {
    Ok(LlmModelConfig {
        model: env_or("COHERE_CHAT_MODEL", DEFAULT_CHAT_MODEL),
        endpoint: cohere_endpoint()?,
        api_key: must_env("COHERE_API_KEY")?,
        temperature: Some(0.1),
        timeout_secs: env_opt_u64("LLM_TIMEOUT_SECS")?,
    })
}

/// Constructs the config for the **embedding** profile.
pub fn config_cohere_embedding() -> Result<LlmModelConfig, LlmError> {
    Ok(LlmModelConfig {
        model: env_or("COHERE_EMBED_MODEL", DEFAULT_EMBED_MODEL),
        endpoint: cohere_endpoint()?,
        api_key: must_env("COHERE_API_KEY")?,
        temperature: None,
        timeout_secs: env_opt_u64("LLM_TIMEOUT_SECS")?,
    })
}
