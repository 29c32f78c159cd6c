//! Cohere v2 service for chat (streaming and structured) and embeddings.
//!
//! Thin client around the hosted REST API. Endpoints are derived from
//! `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v2/chat  — chat completion (streaming or structured JSON)
//! - POST {endpoint}/v2/embed — query embeddings
//!
//! Constructor validation:
//! - `cfg.api_key` must be non-empty
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Errors are normalized via unified error types in `error_handler`.

use std::pin::Pin;
use std::time::{Duration, Instant};

use futures::stream::{Stream, StreamExt};
use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{ConfigError, LlmError, ProviderError, make_snippet, validate_http_endpoint},
};

/// Default per-request timeout for non-streaming calls.
const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Streaming responses stay open while the model generates; allow more.
const STREAM_TIMEOUT_SECS: u64 = 300;

/// One turn of a conversation, as sent by the web client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// A grounding document attached to a chat request.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: String,
    pub data: String,
}

/// A citation emitted by the provider while streaming.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub start: u32,
    pub end: u32,
    pub text: String,
    pub document_id: String,
}

/// Typed event decoded from the provider's chat stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatStreamEvent {
    /// A chunk of generated answer text.
    ContentDelta(String),
    /// The provider started citing one of the attached documents.
    CitationStart(Citation),
    /// The provider finished the message.
    MessageEnd,
}

/// Boxed stream of decoded chat events.
pub type ChatEventStream = Pin<Box<dyn Stream<Item = Result<ChatStreamEvent, LlmError>> + Send>>;

/// Thin client for the Cohere v2 API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` with bearer-auth default headers.
///
/// High-level operations:
/// - [`CohereService::chat_stream`] — streaming chat with optional documents
/// - [`CohereService::chat_json`]   — single chat call with JSON response format
/// - [`CohereService::embed_query`] — single search-query embedding
#[derive(Debug)]
pub struct CohereService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embed: String,
}

impl CohereService {
    /// Creates a new [`CohereService`] from the given config.
    ///
    /// # Errors
    /// - [`LlmError::Config`] if the API key is empty or the endpoint scheme is invalid
    /// - [`LlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, LlmError> {
        if cfg.api_key.trim().is_empty() {
            return Err(ConfigError::MissingVar("COHERE_API_KEY").into());
        }
        validate_http_endpoint("COHERE_API_URL", cfg.endpoint.trim())?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key)).map_err(|e| {
                ProviderError::Decode(format!("invalid API key header: {e}"))
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        let base = cfg.endpoint.trim().trim_end_matches('/').to_string();
        let url_chat = format!("{}/v2/chat", base);
        let url_embed = format!("{}/v2/embed", base);

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            "CohereService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_embed,
        })
    }

    /// Starts a **streaming** chat completion (`/v2/chat` with `stream: true`).
    ///
    /// Returns a stream of [`ChatStreamEvent`] items decoded from the
    /// provider's SSE body. The stream ends after `MessageEnd` (or when the
    /// provider closes the connection). Dropping the returned stream aborts
    /// the underlying request, which is how client disconnects are handled.
    ///
    /// # Errors
    /// - [`LlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`LlmError::HttpTransport`] for connection failures
    pub async fn chat_stream(
        &self,
        messages: Vec<ChatMessage>,
        documents: Vec<Document>,
    ) -> Result<ChatEventStream, LlmError> {
        let body = ChatRequest {
            model: &self.cfg.model,
            messages,
            documents: if documents.is_empty() {
                None
            } else {
                Some(documents)
            },
            temperature: self.cfg.temperature,
            response_format: None,
            stream: true,
        };

        debug!(
            model = %self.cfg.model,
            messages = body.messages.len(),
            documents = body.documents.as_ref().map_or(0, Vec::len),
            "POST {} (stream)", self.url_chat
        );

        let timeout = Duration::from_secs(self.cfg.timeout_secs.unwrap_or(STREAM_TIMEOUT_SECS));
        let resp = self
            .client
            .post(&self.url_chat)
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(%status, %url, %snippet, "chat stream request rejected");

            return Err(ProviderError::HttpStatus {
                status,
                url,
                snippet,
            }
            .into());
        }

        let events = stream_lines(resp.bytes_stream()).filter_map(|line| async move {
            match line {
                Ok(line) => parse_stream_line(&line),
                Err(e) => Some(Err(e)),
            }
        });

        Ok(Box::pin(events))
    }

    /// Performs a **non-streaming** chat call that asks the provider for a
    /// `json_object` response matching `schema`, and returns the raw JSON text.
    ///
    /// # Errors
    /// - [`LlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`LlmError::HttpTransport`] for client/network failures
    /// - [`LlmError::Provider`] with `Decode` if the payload cannot be parsed
    ///   or contains no text content
    pub async fn chat_json(
        &self,
        system: &str,
        user: &str,
        schema: Value,
    ) -> Result<String, LlmError> {
        let started = Instant::now();
        let body = ChatRequest {
            model: &self.cfg.model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: system.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
            documents: None,
            temperature: self.cfg.temperature,
            response_format: Some(ResponseFormat {
                kind: "json_object",
                schema,
            }),
            stream: false,
        };

        debug!(
            model = %self.cfg.model,
            user_len = user.len(),
            "POST {} (json)", self.url_chat
        );

        let timeout = Duration::from_secs(self.cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let resp = self
            .client
            .post(&self.url_chat)
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "chat json request returned non-success status"
            );

            return Err(ProviderError::HttpStatus {
                status,
                url,
                snippet,
            }
            .into());
        }

        let out: ChatResponse = resp.json().await.map_err(|e| {
            ProviderError::Decode(format!(
                "serde error: {e}; expected `message.content[0].text`"
            ))
        })?;

        let text = out
            .message
            .content
            .into_iter()
            .find_map(|c| c.text.filter(|t| !t.is_empty()))
            .ok_or_else(|| ProviderError::Decode("empty `message.content`".into()))?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            "chat json completed"
        );

        Ok(text)
    }

    /// Retrieves a single search-query embedding via `/v2/embed`.
    ///
    /// # Errors
    /// - [`LlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`LlmError::HttpTransport`] for client/network failures
    /// - [`LlmError::Provider`] with `Decode` if the JSON cannot be parsed
    pub async fn embed_query(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        let started = Instant::now();
        let body = EmbedRequest {
            model: &self.cfg.model,
            texts: vec![input],
            input_type: "search_query",
            embedding_types: vec!["float"],
        };

        debug!(
            model = %self.cfg.model,
            input_len = input.len(),
            "POST {}", self.url_embed
        );

        let timeout = Duration::from_secs(self.cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let resp = self
            .client
            .post(&self.url_embed)
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embed.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "embed request returned non-success status"
            );

            return Err(ProviderError::HttpStatus {
                status,
                url,
                snippet,
            }
            .into());
        }

        let out: EmbedResponse = resp.json().await.map_err(|e| {
            ProviderError::Decode(format!("serde error: {e}; expected `embeddings.float[0]`"))
        })?;

        let first = out
            .embeddings
            .float
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode("empty `embeddings.float`".into()))?;

        info!(
            model = %self.cfg.model,
            dim = first.len(),
            latency_ms = started.elapsed().as_millis(),
            "embed completed"
        );

        Ok(first)
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/v2/chat` (both streaming and structured).
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    documents: Option<Vec<Document>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    schema: Value,
}

/// Minimal response for non-streaming `/v2/chat`.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    text: Option<String>,
}

/// Request body for `/v2/embed`.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: Vec<&'a str>,
    input_type: &'static str,
    embedding_types: Vec<&'static str>,
}

/// Response body for `/v2/embed`.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: EmbedVectors,
}

#[derive(Debug, Deserialize)]
struct EmbedVectors {
    #[serde(default)]
    float: Vec<Vec<f32>>,
}

/* ===========================================================================
Stream decoding
======================================================================== */

/// Raw SSE payload shape; every field optional so partial events never panic.
#[derive(Debug, Deserialize)]
struct RawStreamEvent {
    #[serde(rename = "type")]
    kind: Option<String>,
    delta: Option<RawDelta>,
}

#[derive(Debug, Deserialize)]
struct RawDelta {
    message: Option<RawDeltaMessage>,
}

#[derive(Debug, Deserialize)]
struct RawDeltaMessage {
    content: Option<RawDeltaContent>,
    citations: Option<RawCitation>,
}

#[derive(Debug, Deserialize)]
struct RawDeltaContent {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCitation {
    #[serde(default)]
    start: u32,
    #[serde(default)]
    end: u32,
    #[serde(default)]
    text: String,
    #[serde(default)]
    sources: Vec<RawCitationSource>,
}

#[derive(Debug, Deserialize)]
struct RawCitationSource {
    id: Option<String>,
}

/// Parse a single SSE line from the provider stream. Returns:
/// - `Some(Ok(event))` for content deltas, citations, and message end
/// - `Some(Err(e))` for undecodable `data:` payloads
/// - `None` to skip (blank lines, `event:` framing lines, unknown types)
fn parse_stream_line(line: &str) -> Option<Result<ChatStreamEvent, LlmError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    let raw: RawStreamEvent = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            return Some(Err(
                ProviderError::Stream(format!("undecodable stream event: {e}")).into(),
            ));
        }
    };

    match raw.kind.as_deref() {
        Some("content-delta") => {
            let text = raw
                .delta
                .and_then(|d| d.message)
                .and_then(|m| m.content)
                .and_then(|c| c.text)
                .unwrap_or_default();
            if text.is_empty() {
                return None;
            }
            Some(Ok(ChatStreamEvent::ContentDelta(text)))
        }
        Some("citation-start") => {
            let citation = raw
                .delta
                .and_then(|d| d.message)
                .and_then(|m| m.citations)?;
            // A citation without a source document cannot be relayed.
            let document_id = citation.sources.into_iter().find_map(|s| s.id)?;
            Some(Ok(ChatStreamEvent::CitationStart(Citation {
                start: citation.start,
                end: citation.end,
                text: citation.text,
                document_id,
            })))
        }
        Some("message-end") => Some(Ok(ChatStreamEvent::MessageEnd)),
        _ => None,
    }
}

/// Convert a byte stream into a stream of complete lines.
///
/// Provider chunks may split a line anywhere, including inside a multi-byte
/// UTF-8 character. Bytes accumulate in the buffer and are only decoded once
/// a full line is available.
fn stream_lines(
    byte_stream: impl Stream<Item = reqwest::Result<bytes::Bytes>> + Send + 'static,
) -> impl Stream<Item = Result<String, LlmError>> + Send {
    futures::stream::unfold(
        (Box::pin(byte_stream), Vec::new()),
        |(mut stream, mut buffer): (_, Vec<u8>)| async move {
            loop {
                if let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let rest = buffer.split_off(newline_pos + 1);
                    buffer.truncate(newline_pos);
                    let line = String::from_utf8_lossy(&buffer).into_owned();
                    buffer = rest;
                    if !line.trim().is_empty() {
                        return Some((Ok(line), (stream, buffer)));
                    }
                    continue;
                }

                match stream.next().await {
                    Some(Ok(bytes)) => {
                        buffer.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        return Some((Err(LlmError::from(e)), (stream, buffer)));
                    }
                    None => {
                        if buffer.iter().any(|b| !b.is_ascii_whitespace()) {
                            let remaining = String::from_utf8_lossy(&buffer).into_owned();
                            buffer.clear();
                            return Some((Ok(remaining), (stream, buffer)));
                        }
                        return None;
                    }
                }
            }
        },
    )
}
