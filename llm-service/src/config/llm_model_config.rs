/// Configuration for one LLM model invocation profile.
///
/// The backend uses three profiles with different models and temperatures:
/// chat (streaming answers), classifier (deterministic routing decisions),
/// and embedding (query vectors).
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// Model identifier string (e.g., `"command-r-plus"`).
    pub model: String,

    /// Provider API base URL (e.g., `"https://api.cohere.com"`).
    pub endpoint: String,

    /// API key used as a bearer token.
    pub api_key: String,

    /// Sampling temperature; `None` lets the provider pick its default.
    pub temperature: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
