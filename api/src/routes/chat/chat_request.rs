use llm_service::{ChatMessage, Document};
use serde::Deserialize;

/// Body of `POST /api/v1/chat/stream`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Full conversation so far, oldest message first.
    pub messages: Vec<MessageDto>,

    /// Accepted for frontend compatibility; the endpoint always streams.
    #[serde(default = "default_stream")]
    pub stream: bool,

    /// Retrieved job snippets to ground the answer in.
    #[serde(default)]
    pub context: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct MessageDto {
    pub role: String,
    pub content: String,
}

fn default_stream() -> bool {
    true
}

impl ChatRequest {
    /// Number the context snippets as grounding documents ("1", "2", ...).
    /// Citation `document_id`s returned downstream refer to these ids.
    pub fn documents(&self) -> Vec<Document> {
        self.context
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(idx, doc)| Document {
                id: (idx + 1).to_string(),
                data: doc.clone(),
            })
            .collect()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
            .into_iter()
            .map(|m| ChatMessage {
                role: m.role,
                content: m.content,
            })
            .collect()
    }
}
