//! Process configuration, read from the environment

use crate::llm::DEFAULT_BASE_URL;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, concise AI assistant. Keep responses clear and well-structured. Use markdown formatting sparingly.";
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(300);
/// Client-side limit for one `/api/chat` call. Longer than the upstream timeout.
pub const CHAT_CLIENT_TIMEOUT: Duration = Duration::from_secs(310);

/// Relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Provider API key. `None` leaves the proxy unconfigured.
    pub anthropic_api_key: Option<String>,
    /// Provider origin, e.g. `https://api.anthropic.com` or a gateway
    pub anthropic_base_url: String,
    pub port: u16,
    pub default_model: String,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub upstream_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            anthropic_base_url: DEFAULT_BASE_URL.to_string(),
            port: DEFAULT_PORT,
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset and
    /// unparseable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            anthropic_api_key: get("ANTHROPIC_API_KEY").or_else(|| get("VITE_ANTHROPIC_API_KEY")),
            anthropic_base_url: get("ANTHROPIC_BASE_URL").unwrap_or(defaults.anthropic_base_url),
            port: get("CHAT_RELAY_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            default_model: get("DEFAULT_MODEL").unwrap_or(defaults.default_model),
            max_tokens: get("CHAT_MAX_TOKENS")
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_tokens),
            system_prompt: get("CHAT_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            upstream_timeout: get("CHAT_UPSTREAM_TIMEOUT_SECS")
                .and_then(|n| n.parse().ok())
                .map_or(defaults.upstream_timeout, Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> RelayConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RelayConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.port, 3001);
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.anthropic_base_url, "https://api.anthropic.com");
        assert_eq!(config.upstream_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_api_key_fallback() {
        let config = config_from(&[("VITE_ANTHROPIC_API_KEY", "sk-vite")]);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-vite"));

        let config = config_from(&[
            ("ANTHROPIC_API_KEY", "sk-main"),
            ("VITE_ANTHROPIC_API_KEY", "sk-vite"),
        ]);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-main"));
    }

    #[test]
    fn test_empty_key_is_unset() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "  ")]);
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = config_from(&[
            ("CHAT_RELAY_PORT", "8080"),
            ("CHAT_MAX_TOKENS", "not-a-number"),
            ("DEFAULT_MODEL", "claude-3-5-haiku-20241022"),
            ("CHAT_UPSTREAM_TIMEOUT_SECS", "30"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.default_model, "claude-3-5-haiku-20241022");
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
    }
}
