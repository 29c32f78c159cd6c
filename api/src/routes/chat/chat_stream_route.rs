use std::{collections::VecDeque, convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt, stream};
use llm_service::{ChatEventStream, ChatStreamEvent, Citation, LlmError};
use serde_json::json;
use tracing::{debug, error};

use crate::{
    core::app_state::AppState, middleware_layer::json_extractor::ApiJson,
    routes::chat::chat_request::ChatRequest,
};

/// Sentinel that tells the frontend the stream is over.
const DONE_SENTINEL: &str = "[DONE]";

/// Marker sent right before the sentinel on a clean finish.
const STREAM_END_MARK: &str = ".";

/// `POST /api/v1/chat/stream` — relay the provider's chat stream as SSE.
///
/// Deltas are forwarded as JSON-encoded strings, citations as
/// `citation-start` objects. The stream always terminates with `[DONE]`;
/// failures surface as an in-stream `{"error": ...}` event rather than an
/// HTTP error, since headers are already sent once streaming starts.
///
/// Dropping the response body (client disconnect) drops the upstream
/// request as well, so abandoned chats do not keep burning provider tokens.
pub async fn chat_stream_route(
    State(state): State<Arc<AppState>>,
    ApiJson(p): ApiJson<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!(
        messages = p.messages.len(),
        context = p.context.as_deref().map(<[String]>::len).unwrap_or(0),
        stream = p.stream,
        "chat_stream_route: start"
    );

    let documents = p.documents();
    let payloads = match state.llm.chat_stream(p.into_messages(), documents).await {
        Ok(upstream) => relay_payloads(upstream).boxed(),
        Err(e) => {
            error!(error = %e, "chat_stream_route: upstream request failed");
            stream::iter(vec![error_payload(&e), DONE_SENTINEL.to_string()]).boxed()
        }
    };

    let events = payloads.map(|payload| Ok(Event::default().data(payload)));
    Sse::new(events).keep_alive(KeepAlive::default())
}

enum RelayState {
    Streaming(ChatEventStream),
    Draining(VecDeque<String>),
}

/// Translate provider events into outbound SSE payload strings.
///
/// Provider `message-end` events are skipped; the end-of-answer marker and
/// the `[DONE]` sentinel are emitted once the upstream is exhausted. A
/// mid-stream error short-circuits to an error payload followed by the
/// sentinel.
fn relay_payloads(upstream: ChatEventStream) -> impl Stream<Item = String> {
    stream::unfold(RelayState::Streaming(upstream), |state| async move {
        match state {
            RelayState::Streaming(mut upstream) => loop {
                match upstream.next().await {
                    Some(Ok(ChatStreamEvent::ContentDelta(text))) => {
                        return Some((delta_payload(&text), RelayState::Streaming(upstream)));
                    }
                    Some(Ok(ChatStreamEvent::CitationStart(citation))) => {
                        return Some((
                            citation_payload(&citation),
                            RelayState::Streaming(upstream),
                        ));
                    }
                    Some(Ok(ChatStreamEvent::MessageEnd)) => continue,
                    Some(Err(e)) => {
                        error!(error = %e, "chat_stream_route: stream failed mid-answer");
                        let rest = VecDeque::from([DONE_SENTINEL.to_string()]);
                        return Some((error_payload(&e), RelayState::Draining(rest)));
                    }
                    None => {
                        let rest = VecDeque::from([DONE_SENTINEL.to_string()]);
                        return Some((STREAM_END_MARK.to_string(), RelayState::Draining(rest)));
                    }
                }
            },
            RelayState::Draining(mut rest) => {
                let payload = rest.pop_front()?;
                Some((payload, RelayState::Draining(rest)))
            }
        }
    })
}

/// A delta is relayed as a bare JSON string so the frontend can `JSON.parse`
/// every `data:` line the same way.
fn delta_payload(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

fn citation_payload(citation: &Citation) -> String {
    json!({
        "type": "citation-start",
        "citations": [{
            "start": citation.start,
            "end": citation.end,
            "text": citation.text,
            "document_id": citation.document_id,
        }],
    })
    .to_string()
}

fn error_payload(e: &LlmError) -> String {
    json!({ "error": e.to_string() }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_service::error_handler::ProviderError;

    fn upstream_of(events: Vec<Result<ChatStreamEvent, LlmError>>) -> ChatEventStream {
        stream::iter(events).boxed()
    }

    #[tokio::test]
    async fn clean_stream_ends_with_mark_and_sentinel() {
        let upstream = upstream_of(vec![
            Ok(ChatStreamEvent::ContentDelta("Hello".into())),
            Ok(ChatStreamEvent::ContentDelta(" world".into())),
            Ok(ChatStreamEvent::MessageEnd),
        ]);

        let payloads: Vec<String> = relay_payloads(upstream).collect().await;
        assert_eq!(payloads, vec!["\"Hello\"", "\" world\"", ".", "[DONE]"]);
    }

    #[tokio::test]
    async fn citations_are_relayed_as_citation_start_objects() {
        let upstream = upstream_of(vec![Ok(ChatStreamEvent::CitationStart(Citation {
            start: 5,
            end: 12,
            text: "Acme Co".into(),
            document_id: "2".into(),
        }))]);

        let payloads: Vec<String> = relay_payloads(upstream).collect().await;
        let event: serde_json::Value = serde_json::from_str(&payloads[0]).unwrap();
        assert_eq!(event["type"], "citation-start");
        assert_eq!(event["citations"][0]["start"], 5);
        assert_eq!(event["citations"][0]["document_id"], "2");
        assert_eq!(payloads.last().unwrap(), "[DONE]");
    }

    #[tokio::test]
    async fn mid_stream_error_yields_error_event_then_sentinel() {
        let upstream = upstream_of(vec![
            Ok(ChatStreamEvent::ContentDelta("Hel".into())),
            Err(LlmError::Provider(ProviderError::Stream(
                "connection reset".into(),
            ))),
        ]);

        let payloads: Vec<String> = relay_payloads(upstream).collect().await;
        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads[0], "\"Hel\"");
        let event: serde_json::Value = serde_json::from_str(&payloads[1]).unwrap();
        assert!(event["error"].as_str().unwrap().contains("connection reset"));
        assert_eq!(payloads[2], "[DONE]");
    }

    #[test]
    fn delta_payload_json_encodes_special_characters() {
        assert_eq!(delta_payload("line\nbreak"), r#""line\nbreak""#);
        assert_eq!(delta_payload("a \"quote\""), r#""a \"quote\"""#);
    }
}
