//! JSON bodies of `POST /api/chat`
//!
//! Shared by the server handler and the conversation controller's HTTP
//! transport so both sides agree on one contract.

use crate::llm::{ContentBlock, LlmMessage, LlmResponse, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body. Only `role` and `content` of each message are read; unknown
/// fields anywhere are ignored. Missing settings are filled by the proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default)]
    pub messages: Vec<LlmMessage>,
}

/// Success body. `content` holds at most one text block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatReply {
    /// The assistant's answer: the first text block, unless it is empty.
    pub fn reply_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .filter(|text| !text.is_empty())
    }
}

impl From<LlmResponse> for ChatReply {
    fn from(response: LlmResponse) -> Self {
        let content = response
            .first_text()
            .map(|text| vec![ContentBlock::text(text)])
            .unwrap_or_default();

        Self {
            model: response.model,
            content,
            stop_reason: response.stop_reason,
            usage: Some(response.usage),
        }
    }
}

/// Failure body, shaped like the provider's own error envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: "error".to_string(),
            error: ErrorDetail {
                kind: kind.into(),
                message: message.into(),
            },
        }
    }
}

/// Best-effort message from an error body: `error.message`, a bare string
/// `error`, or a top-level `message`. Empty strings count as absent.
pub fn error_message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| value.get("error").and_then(Value::as_str))
        .or_else(|| value.get("message").and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
