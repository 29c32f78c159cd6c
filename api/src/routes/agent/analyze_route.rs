use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::debug;

use crate::{
    core::app_state::AppState,
    middleware_layer::json_extractor::ApiJson,
    routes::agent::agent_types::{AgentQuery, AgentResponse},
};

/// `POST /api/v1/agent/analyze` — classify a query without searching.
///
/// Never fails: a classifier outage degrades to `needs_vector_search = true`.
pub async fn analyze_route(
    State(state): State<Arc<AppState>>,
    ApiJson(p): ApiJson<AgentQuery>,
) -> Json<AgentResponse> {
    debug!(query = %p.query, "analyze_route: start");

    let analysis = query_agent::analyze_query(&state.llm, &p.query).await;

    debug!(
        needs_vector_search = analysis.needs_vector_search,
        "analyze_route: done"
    );

    Json(AgentResponse {
        needs_vector_search: analysis.needs_vector_search,
    })
}
