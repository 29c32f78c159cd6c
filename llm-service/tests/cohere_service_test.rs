//! Integration tests for the Cohere client against a mock provider.

use anyhow::Result;
use futures::StreamExt;
use httpmock::prelude::*;

use llm_service::config::llm_model_config::LlmModelConfig;
use llm_service::error_handler::{LlmError, ProviderError};
use llm_service::{ChatMessage, ChatStreamEvent, CohereService, Document};

fn test_config(endpoint: String) -> LlmModelConfig {
    LlmModelConfig {
        model: "command-r-plus".to_string(),
        endpoint,
        api_key: "test-key".to_string(),
        temperature: Some(0.3),
        timeout_secs: Some(5),
    }
}

fn user_message(content: &str) -> Vec<ChatMessage> {
    vec![ChatMessage {
        role: "user".to_string(),
        content: content.to_string(),
    }]
}

#[tokio::test]
async fn chat_json_returns_model_text() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/chat")
                .header("authorization", "Bearer test-key")
                .json_body_partial(r#"{"stream": false}"#);
            then.status(200).json_body(serde_json::json!({
                "message": {
                    "content": [
                        {"type": "text", "text": "{\"needs_vector_search\": true}"}
                    ]
                }
            }));
        })
        .await;

    let svc = CohereService::new(test_config(server.base_url()))?;
    let text = svc
        .chat_json("decide", "find rust jobs", serde_json::json!({"type": "object"}))
        .await?;

    mock.assert_async().await;
    assert_eq!(text, "{\"needs_vector_search\": true}");
    Ok(())
}

#[tokio::test]
async fn chat_json_maps_provider_status_errors() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/chat");
            then.status(429).body("rate limited");
        })
        .await;

    let svc = CohereService::new(test_config(server.base_url()))?;
    let err = svc
        .chat_json("decide", "q", serde_json::json!({}))
        .await
        .unwrap_err();

    match err {
        LlmError::Provider(ProviderError::HttpStatus {
            status, snippet, ..
        }) => {
            assert_eq!(status.as_u16(), 429);
            assert_eq!(snippet, "rate limited");
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn chat_json_rejects_empty_content() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/chat");
            then.status(200)
                .json_body(serde_json::json!({"message": {"content": []}}));
        })
        .await;

    let svc = CohereService::new(test_config(server.base_url()))?;
    let err = svc
        .chat_json("decide", "q", serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LlmError::Provider(ProviderError::Decode(_))
    ));
    Ok(())
}

#[tokio::test]
async fn chat_stream_decodes_provider_events() -> Result<()> {
    let server = MockServer::start_async().await;
    let sse_body = concat!(
        "event: content-delta\n",
        "data: {\"type\":\"content-delta\",\"delta\":{\"message\":{\"content\":{\"text\":\"Rust \"}}}}\n",
        "\n",
        "event: content-delta\n",
        "data: {\"type\":\"content-delta\",\"delta\":{\"message\":{\"content\":{\"text\":\"jobs\"}}}}\n",
        "\n",
        "event: citation-start\n",
        "data: {\"type\":\"citation-start\",\"delta\":{\"message\":{\"citations\":{\"start\":0,\"end\":4,\"text\":\"Rust\",\"sources\":[{\"type\":\"document\",\"id\":\"1\"}]}}}}\n",
        "\n",
        "event: message-end\n",
        "data: {\"type\":\"message-end\",\"delta\":{\"finish_reason\":\"COMPLETE\"}}\n",
        "\n",
    );
    let mock = server
        .mock_async(move |when, then| {
            when.method(POST)
                .path("/v2/chat")
                .json_body_partial(r#"{"stream": true}"#);
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(sse_body);
        })
        .await;

    let svc = CohereService::new(test_config(server.base_url()))?;
    let documents = vec![Document {
        id: "1".to_string(),
        data: "Rust engineer opening".to_string(),
    }];
    let stream = svc
        .chat_stream(user_message("find rust jobs"), documents)
        .await?;
    let events: Vec<_> = stream.collect().await;

    mock.assert_async().await;
    assert_eq!(events.len(), 4);
    assert_eq!(
        *events[0].as_ref().unwrap(),
        ChatStreamEvent::ContentDelta("Rust ".to_string())
    );
    assert_eq!(
        *events[1].as_ref().unwrap(),
        ChatStreamEvent::ContentDelta("jobs".to_string())
    );
    assert!(matches!(
        events[2].as_ref().unwrap(),
        ChatStreamEvent::CitationStart(c) if c.document_id == "1" && c.end == 4
    ));
    assert_eq!(*events[3].as_ref().unwrap(), ChatStreamEvent::MessageEnd);
    Ok(())
}

#[tokio::test]
async fn chat_stream_rejected_before_headers_is_an_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/chat");
            then.status(500).body("boom");
        })
        .await;

    let svc = CohereService::new(test_config(server.base_url()))?;
    let err = svc
        .chat_stream(user_message("hi"), Vec::new())
        .await
        .err()
        .unwrap();
    assert!(matches!(
        err,
        LlmError::Provider(ProviderError::HttpStatus { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn embed_returns_first_vector() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/embed")
                .json_body_partial(r#"{"input_type": "search_query"}"#);
            then.status(200).json_body(serde_json::json!({
                "embeddings": {"float": [[0.25, -0.5, 0.75]]}
            }));
        })
        .await;

    let svc = CohereService::new(test_config(server.base_url()))?;
    let vector = svc.embed_query("data scientist salary").await?;

    mock.assert_async().await;
    assert_eq!(vector, vec![0.25, -0.5, 0.75]);
    Ok(())
}

#[tokio::test]
async fn embed_rejects_empty_embeddings() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/embed");
            then.status(200)
                .json_body(serde_json::json!({"embeddings": {"float": []}}));
        })
        .await;

    let svc = CohereService::new(test_config(server.base_url()))?;
    let err = svc.embed_query("q").await.unwrap_err();
    assert!(matches!(
        err,
        LlmError::Provider(ProviderError::Decode(_))
    ));
    Ok(())
}
