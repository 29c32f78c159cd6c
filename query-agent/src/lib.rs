//! Routing agent over the LLM provider and the vector index.
//!
//! Public API: [`analyze_query`], [`vector_search`], [`analyze_and_search`].
//! The agent classifies a user query (does it need job retrieval, or is it
//! general career advice?), embeds the query, fetches top-K matches from the
//! index, and merges both results for the caller.

mod prompt;

mod api_types;

pub use api_types::QueryAnalysis;

pub use vector_index::QueryMatch;

use llm_service::LlmServiceProfiles;
use tracing::{info, warn};
use vector_index::PineconeIndex;

/// Classify a user query: does it require searching the job index?
///
/// Runs the low-temperature classifier profile with a strict JSON schema and
/// parses the verdict. Any failure along the way (provider error, malformed
/// JSON, missing fields) degrades to `needs_vector_search = true` so the user
/// still gets retrieval-backed answers when the classifier is unavailable.
pub async fn analyze_query(llm: &LlmServiceProfiles, query: &str) -> QueryAnalysis {
    let raw = match llm
        .classify_json(prompt::CLASSIFIER_SYSTEM, query, prompt::classifier_schema())
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "classifier call failed, defaulting to vector search");
            return fallback_analysis(query, &format!("classifier unavailable: {e}"));
        }
    };

    match parse_analysis(&raw, query) {
        Some(analysis) => {
            info!(
                needs_vector_search = analysis.needs_vector_search,
                "query classified"
            );
            analysis
        }
        None => {
            warn!(raw = %raw, "classifier returned undecodable JSON, defaulting to vector search");
            fallback_analysis(query, "classifier reply was not valid JSON")
        }
    }
}

/// Embed the query and fetch top-K matches from the index.
///
/// Failures are absorbed: an embedding or index error yields an empty match
/// list so a degraded retrieval path never fails the whole request.
pub async fn vector_search(
    llm: &LlmServiceProfiles,
    index: &PineconeIndex,
    query: &str,
) -> Vec<QueryMatch> {
    let vector = match llm.embed(query).await {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "query embedding failed, returning no matches");
            return Vec::new();
        }
    };

    match index.query_top_k(vector, None).await {
        Ok(matches) => matches,
        Err(e) => {
            warn!(error = %e, "index query failed, returning no matches");
            Vec::new()
        }
    }
}

/// Run the classifier and the retrieval path concurrently, then merge.
///
/// Retrieval is started speculatively so the combined call costs one round
/// trip instead of two. When the classifier decides the query does not need
/// the index, the speculative matches are discarded.
pub async fn analyze_and_search(
    llm: &LlmServiceProfiles,
    index: &PineconeIndex,
    query: &str,
) -> (QueryAnalysis, Vec<QueryMatch>) {
    let (analysis, matches) = tokio::join!(
        analyze_query(llm, query),
        vector_search(llm, index, query)
    );

    let matches = if analysis.needs_vector_search {
        matches
    } else {
        Vec::new()
    };

    info!(
        needs_vector_search = analysis.needs_vector_search,
        hits = matches.len(),
        "combined analysis completed"
    );

    (analysis, matches)
}

fn fallback_analysis(query: &str, reasoning: &str) -> QueryAnalysis {
    QueryAnalysis {
        needs_vector_search: true,
        reasoning: reasoning.to_string(),
        modified_query: query.to_string(),
    }
}

/// Parse the classifier reply, tolerating missing optional fields.
///
/// Returns `None` when the reply is not a JSON object; a missing
/// `needs_vector_search` defaults to `true` and a missing `modified_query`
/// falls back to the original query text.
fn parse_analysis(raw: &str, original_query: &str) -> Option<QueryAnalysis> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    if !value.is_object() {
        return None;
    }

    Some(QueryAnalysis {
        needs_vector_search: value
            .get("needs_vector_search")
            .and_then(|v| v.as_bool())
            .unwrap_or(true),
        reasoning: value
            .get("reasoning")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        modified_query: value
            .get("modified_query")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(original_query)
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_verdict() {
        let raw = r#"{"needs_vector_search": false, "reasoning": "general advice", "modified_query": "cover letter tips"}"#;
        let analysis = parse_analysis(raw, "Tips for writing a cover letter").unwrap();
        assert!(!analysis.needs_vector_search);
        assert_eq!(analysis.reasoning, "general advice");
        assert_eq!(analysis.modified_query, "cover letter tips");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let raw = r#"{"reasoning": "unsure"}"#;
        let analysis = parse_analysis(raw, "rust jobs in berlin").unwrap();
        assert!(analysis.needs_vector_search);
        assert_eq!(analysis.modified_query, "rust jobs in berlin");
    }

    #[test]
    fn empty_modified_query_falls_back_to_the_original() {
        let raw = r#"{"needs_vector_search": true, "reasoning": "job query", "modified_query": "  "}"#;
        let analysis = parse_analysis(raw, "data science salaries").unwrap();
        assert_eq!(analysis.modified_query, "data science salaries");
    }

    #[test]
    fn non_object_replies_are_rejected() {
        assert!(parse_analysis("[]", "q").is_none());
        assert!(parse_analysis("not json at all", "q").is_none());
        assert!(parse_analysis("\"just a string\"", "q").is_none());
    }

    #[test]
    fn fallback_keeps_the_original_query() {
        let analysis = fallback_analysis("find ml jobs", "classifier unavailable: timeout");
        assert!(analysis.needs_vector_search);
        assert_eq!(analysis.modified_query, "find ml jobs");
        assert!(analysis.reasoning.contains("classifier unavailable"));
    }
}
