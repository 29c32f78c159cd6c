use query_agent::QueryMatch;
use serde::{Deserialize, Serialize};

/// Body of the agent endpoints.
#[derive(Debug, Deserialize)]
pub struct AgentQuery {
    pub query: String,
}

/// Routing verdict exposed to the frontend. Classifier internals
/// (reasoning, query rewrite) stay server-side.
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub needs_vector_search: bool,
}

/// Body of `POST /api/v1/agent/analyze_and_search`.
#[derive(Debug, Serialize)]
pub struct CombinedResponse {
    pub analysis: AgentResponse,
    pub vector_results: Vec<QueryMatch>,
}
