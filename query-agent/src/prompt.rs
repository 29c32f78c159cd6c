//! Classifier prompt: routing instructions + strict JSON output schema.

/// System instructions for the routing classifier.
///
/// Keep this short: the model only has to pick a branch, not write prose.
pub const CLASSIFIER_SYSTEM: &str = r#"You are an AI agent that decides if a user query requires searching a job database.
Analyze the query and decide if it:
1. Needs job search (queries about specific jobs, companies, positions, salaries, etc.)
2. Can be answered with general knowledge (questions about career advice, resume tips, interview preparation, etc.)

Return your decision in JSON format:
{
    "needs_vector_search": boolean,
    "reasoning": "brief explanation",
    "modified_query": "optional modified query for better search results"
}

Examples:
- "Find me software engineering jobs in San Francisco" -> needs_vector_search: true
- "How do I prepare for a behavioral interview?" -> needs_vector_search: false
- "What are typical salaries for data scientists?" -> needs_vector_search: true
- "Tips for writing a cover letter" -> needs_vector_search: false
"#;

/// JSON schema passed to the provider's structured-output mode so the
/// classifier reply is machine-parseable.
pub fn classifier_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "needs_vector_search": { "type": "boolean" },
            "reasoning": { "type": "string" },
            "modified_query": { "type": "string" }
        },
        "required": ["needs_vector_search", "reasoning"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_the_decision_field() {
        let schema = classifier_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "needs_vector_search"));
        assert!(schema["properties"]["needs_vector_search"]["type"] == "boolean");
    }
}
