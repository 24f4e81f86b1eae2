//! How the controller reaches the proxy

use crate::api::wire::{error_message_from_body, ChatReply, ChatRequest};
use crate::config::CHAT_CLIENT_TIMEOUT;
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// Failure of one submission, as seen by the controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Non-2xx answer from the chat endpoint
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Failed to reach the chat server: {0}")]
    Network(String),
    #[error("Invalid response from the chat server: {0}")]
    InvalidResponse(String),
}

impl ChatError {
    /// Build from a non-2xx answer, preferring the server's own message
    pub fn from_response(status: u16, body: &str) -> Self {
        let message =
            error_message_from_body(body).unwrap_or_else(|| format!("API error: {status}"));
        ChatError::Server { status, message }
    }

    /// HTTP status, when the server answered at all
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ChatError::Server { status, .. } => Some(*status),
            ChatError::Network(_) | ChatError::InvalidResponse(_) => None,
        }
    }
}

/// Sends one request to the chat endpoint
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}

/// `POST {base_url}/api/chat` over HTTP
pub struct HttpChatTransport {
    client: Client,
    endpoint: String,
}

impl HttpChatTransport {
    pub fn new(base_url: &str) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(CHAT_CLIENT_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ChatError::from_response(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ChatError::InvalidResponse(e.to_string()))
    }
}
