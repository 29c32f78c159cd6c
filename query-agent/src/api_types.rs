//! Public data types returned by the agent.

use serde::{Deserialize, Serialize};

/// Classifier verdict for a single user query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalysis {
    /// Whether the query should be answered with job-index retrieval.
    pub needs_vector_search: bool,

    /// Brief model explanation of the decision.
    #[serde(default)]
    pub reasoning: String,

    /// Query rewritten for better retrieval; falls back to the original text.
    #[serde(default)]
    pub modified_query: String,
}
