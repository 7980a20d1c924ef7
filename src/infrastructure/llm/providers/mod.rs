//! # LLM Providers
//!
//! Contains implementations for specific LLM providers:
//! - OpenAI-compatible API (OpenAI, Groq)
//! - Gemini

mod gemini;
mod openai;

use std::time::Duration;

use crate::domain::config::ProviderSettings;
use crate::infrastructure::llm::{Context, Error, Provider, Response};

/// Configuration for a provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key
    pub api_key: String,
    /// Base URL (for non-default endpoints)
    pub base_url: Option<String>,
    /// Default model
    pub default_model: String,
    /// Timeout in seconds
    pub timeout: Option<u64>,
    /// Completion length cap
    pub max_tokens: Option<u32>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ProviderConfig {
    /// Build from settings, reading the API key from the environment variable they name.
    pub fn from_settings(provider: &str, settings: &ProviderSettings) -> Result<Self, Error> {
        let env_var = settings.api_key_env.as_deref().ok_or_else(|| {
            Error::new(provider, "No API key configured - set api_key_env for this provider")
        })?;
        let api_key = std::env::var(env_var)
            .map_err(|e| Error::new(provider, format!("API key env var {} not set: {}", env_var, e)))?;

        Ok(Self {
            api_key,
            base_url: settings.endpoint.clone(),
            default_model: settings.model.clone().unwrap_or_default(),
            timeout: settings.timeout,
            max_tokens: settings.max_tokens,
        })
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(120))
    }
}

/// Execute a chat request with the specified provider
pub async fn chat(
    provider: Provider,
    config: ProviderConfig,
    context: Context,
) -> Result<Response, Error> {
    match provider {
        Provider::OpenAI => openai::chat("openai", config, context).await,
        Provider::Groq => {
            // Groq uses OpenAI-compatible API
            let config_with_url = ProviderConfig {
                base_url: Some(
                    config
                        .base_url
                        .clone()
                        .unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
                ),
                ..config
            };
            openai::chat("groq", config_with_url, context).await
        }
        Provider::Gemini => gemini::chat(config, context).await,
    }
}

/// Pull a provider error message out of a JSON error body, if there is one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    json.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// HTTP client reused across requests
pub(crate) fn http_client() -> &'static reqwest::Client {
    use std::sync::OnceLock;
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":{"message":"Invalid API key"}}"#).as_deref(),
            Some("Invalid API key")
        );
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_missing_key_env_is_error() {
        let settings = ProviderSettings {
            model: Some("gpt-4o-mini".into()),
            endpoint: None,
            api_key_env: Some("RAZE_TEST_KEY_THAT_IS_NEVER_SET".into()),
            timeout: None,
            max_tokens: None,
        };
        let err = ProviderConfig::from_settings("openai", &settings).unwrap_err();
        assert!(err.message.contains("RAZE_TEST_KEY_THAT_IS_NEVER_SET"));

        let none = ProviderConfig::from_settings("custom", &ProviderSettings::default());
        assert!(none.is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProviderConfig {
            api_key: "sk-secret".into(),
            base_url: None,
            default_model: "m".into(),
            timeout: None,
            max_tokens: None,
        };
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
