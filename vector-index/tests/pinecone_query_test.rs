//! Integration tests for the index client against a mock data plane.

use anyhow::Result;
use httpmock::prelude::*;

use vector_index::{IndexConfig, PineconeIndex, VectorIndexError};

fn test_config(host: String) -> IndexConfig {
    IndexConfig {
        host,
        api_key: "test-index-key".to_string(),
        top_k: 3,
    }
}

#[tokio::test]
async fn query_returns_ranked_matches_with_metadata() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/query")
                .header("api-key", "test-index-key")
                .json_body_partial(r#"{"topK": 3, "includeMetadata": true}"#);
            then.status(200).json_body(serde_json::json!({
                "matches": [
                    {"id": "job-1", "score": 0.91, "metadata": {"title": "Rust Engineer"}},
                    {"id": "job-2", "score": 0.83, "metadata": {"title": "Backend Developer"}}
                ],
                "namespace": ""
            }));
        })
        .await;

    let index = PineconeIndex::new(test_config(server.base_url()))?;
    let matches = index.query_top_k(vec![0.1, 0.2, 0.3], None).await?;

    mock.assert_async().await;
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "job-1");
    assert!(matches[0].score > matches[1].score);
    assert_eq!(
        matches[0].metadata.as_ref().unwrap()["title"],
        "Rust Engineer"
    );
    Ok(())
}

#[tokio::test]
async fn query_honors_explicit_k() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/query")
                .json_body_partial(r#"{"topK": 7}"#);
            then.status(200).json_body(serde_json::json!({"matches": []}));
        })
        .await;

    let index = PineconeIndex::new(test_config(server.base_url()))?;
    let matches = index.query_top_k(vec![0.5], Some(7)).await?;

    mock.assert_async().await;
    assert!(matches.is_empty());
    Ok(())
}

#[tokio::test]
async fn query_maps_index_status_errors() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(401).body("unauthorized");
        })
        .await;

    let index = PineconeIndex::new(test_config(server.base_url()))?;
    let err = index.query_top_k(vec![0.5], None).await.unwrap_err();

    match err {
        VectorIndexError::HttpStatus { status, snippet } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(snippet, "unauthorized");
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
