use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::debug;

use crate::{
    core::app_state::AppState,
    middleware_layer::json_extractor::ApiJson,
    routes::agent::agent_types::{AgentQuery, AgentResponse, CombinedResponse},
};

/// `POST /api/v1/agent/analyze_and_search` — classify and retrieve in one
/// round trip.
///
/// Classification and retrieval run concurrently; when the classifier rules
/// out retrieval, the speculative matches are dropped and `vector_results`
/// comes back empty. Retrieval failures also degrade to an empty list.
pub async fn analyze_and_search_route(
    State(state): State<Arc<AppState>>,
    ApiJson(p): ApiJson<AgentQuery>,
) -> Json<CombinedResponse> {
    debug!(query = %p.query, "analyze_and_search_route: start");

    let (analysis, vector_results) =
        query_agent::analyze_and_search(&state.llm, &state.index, &p.query).await;

    debug!(
        needs_vector_search = analysis.needs_vector_search,
        hits = vector_results.len(),
        "analyze_and_search_route: done"
    );

    Json(CombinedResponse {
        analysis: AgentResponse {
            needs_vector_search: analysis.needs_vector_search,
        },
        vector_results,
    })
}
