//! Proxy adapter: relays a conversation to the provider
//!
//! Holds the credentials and defaults so browsers never see the API key.
//! Stateless per call; one instance is shared by every request handler.

use crate::api::wire::{ChatReply, ChatRequest};
use crate::config::RelayConfig;
use crate::llm::{AnthropicService, LlmError, LlmRequest, LlmService, LoggingService};
use axum::http::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// Why the adapter cannot reach the provider at all
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,
    #[error("failed to build provider client: {0}")]
    Client(String),
}

/// Error returned by [`ProxyAdapter::forward`]
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("server configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    InvalidRequest(String),
    /// Provider answered with a non-success status
    #[error("{message}")]
    Upstream { status: u16, message: String },
    /// Provider unreachable or its answer unreadable
    #[error("{0}")]
    BadGateway(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Machine-readable kind for the error body
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Config(_) => "configuration_error",
            ProxyError::InvalidRequest(_) => "invalid_request_error",
            ProxyError::Upstream { .. } => "upstream_error",
            ProxyError::BadGateway(_) => "bad_gateway",
        }
    }

    /// Message safe to show to the end user. Configuration details stay in
    /// the server log.
    pub fn public_message(&self) -> String {
        match self {
            ProxyError::Config(_) => "The chat service is not configured".to_string(),
            ProxyError::BadGateway(_) => "Failed to reach the model provider".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<LlmError> for ProxyError {
    fn from(err: LlmError) -> Self {
        match err.status {
            Some(status) => ProxyError::Upstream {
                status,
                message: err.message,
            },
            None => ProxyError::BadGateway(err.message),
        }
    }
}

/// Values attached to requests that leave them out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyDefaults {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
}

impl ProxyDefaults {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            model: config.default_model.clone(),
            max_tokens: config.max_tokens,
            system: config.system_prompt.clone(),
        }
    }

    fn resolve(&self, request: ChatRequest) -> Result<LlmRequest, ProxyError> {
        if request.messages.is_empty() {
            return Err(ProxyError::InvalidRequest(
                "messages must contain at least one message".to_string(),
            ));
        }
        let max_tokens = request.max_tokens.unwrap_or(self.max_tokens);
        if max_tokens == 0 {
            return Err(ProxyError::InvalidRequest(
                "max_tokens must be greater than zero".to_string(),
            ));
        }

        Ok(LlmRequest {
            model: request
                .model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| self.model.clone()),
            max_tokens,
            system: Some(request.system.unwrap_or_else(|| self.system.clone())),
            messages: request.messages,
        })
    }
}

enum Upstream {
    Ready(Arc<dyn LlmService>),
    Unconfigured(ConfigError),
}

/// The backend half of `POST /api/chat`
pub struct ProxyAdapter {
    upstream: Upstream,
    defaults: ProxyDefaults,
}

impl ProxyAdapter {
    pub fn new(upstream: Arc<dyn LlmService>, defaults: ProxyDefaults) -> Self {
        Self {
            upstream: Upstream::Ready(upstream),
            defaults,
        }
    }

    /// An adapter that fails every call with `error`
    pub fn unconfigured(error: ConfigError, defaults: ProxyDefaults) -> Self {
        Self {
            upstream: Upstream::Unconfigured(error),
            defaults,
        }
    }

    /// Build the Anthropic-backed adapter. A missing key is not an error
    /// here: the adapter is returned unconfigured and rejects every call.
    pub fn from_config(config: &RelayConfig) -> Self {
        let defaults = ProxyDefaults::from_config(config);
        let Some(api_key) = config.anthropic_api_key.clone() else {
            return Self::unconfigured(ConfigError::MissingApiKey, defaults);
        };

        match AnthropicService::new(api_key, &config.anthropic_base_url, config.upstream_timeout) {
            Ok(service) => Self::new(Arc::new(LoggingService::new(Arc::new(service))), defaults),
            Err(e) => Self::unconfigured(ConfigError::Client(e.message), defaults),
        }
    }

    /// The configuration problem, if this adapter cannot serve requests
    pub fn config_error(&self) -> Option<&ConfigError> {
        match &self.upstream {
            Upstream::Ready(_) => None,
            Upstream::Unconfigured(e) => Some(e),
        }
    }

    pub fn defaults(&self) -> &ProxyDefaults {
        &self.defaults
    }

    /// Forward one conversation to the provider. Single attempt.
    pub async fn forward(&self, request: ChatRequest) -> Result<ChatReply, ProxyError> {
        let service = match &self.upstream {
            Upstream::Ready(service) => service,
            Upstream::Unconfigured(e) => return Err(e.clone().into()),
        };

        let request = self.defaults.resolve(request)?;
        let response = service.complete(&request).await?;
        Ok(ChatReply::from(response))
    }
}
