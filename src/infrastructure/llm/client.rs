//! # LLM Client
//!
//! Provides the `Client` struct, the entry point for LLM interactions.
//! A client is bound to one provider and routes requests to its implementation.

use async_trait::async_trait;

use crate::domain::config::LlmConfig;
use crate::domain::traits::LlmProvider;
use crate::infrastructure::llm::providers::{self, ProviderConfig};
use crate::infrastructure::llm::{Context, Error, Provider, Response};

/// Low temperature keeps plans close to the documented schema.
const PLAN_TEMPERATURE: f32 = 0.2;

/// Simple LLM client
#[derive(Debug, Clone)]
pub struct Client {
    provider: Provider,
    config: ProviderConfig,
    model: Option<String>,
}

impl Client {
    pub fn new(provider: Provider, config: ProviderConfig) -> Self {
        Self {
            provider,
            config,
            model: None,
        }
    }

    /// Build a client for a provider name using configured settings.
    ///
    /// # Arguments
    /// * `provider_name` - e.g. "openai", "groq", "gemini"
    /// * `model` - Optional model override for this session
    pub fn from_config(
        llm: &LlmConfig,
        provider_name: &str,
        model: Option<&str>,
    ) -> Result<Self, Error> {
        let provider = Provider::from_str(provider_name)
            .ok_or_else(|| Error::new(provider_name, "Unknown provider"))?;
        let settings = llm.provider(provider.as_str());
        let config = ProviderConfig::from_settings(provider.as_str(), &settings)?;

        let mut client = Self::new(provider, config);
        client.model = model.map(str::to_string);
        Ok(client)
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// The model requests will use
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or(self.config.default_model.as_str())
    }

    /// Send a system instruction and user prompt
    pub async fn prompt(&self, system: &str, prompt: &str) -> Result<Response, Error> {
        let mut context = Context::new()
            .add_system_message(system)
            .add_user_message(prompt)
            .with_temperature(PLAN_TEMPERATURE)
            .with_max_tokens(self.config.max_tokens);
        if let Some(model) = &self.model {
            context = context.with_model(model.clone());
        }

        let response = providers::chat(self.provider, self.config.clone(), context).await?;
        tracing::info!(
            "{} ({}) replied with {} chars, {} tokens",
            self.provider.as_str(),
            response.model,
            response.content.len(),
            response.usage.total_tokens
        );
        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for Client {
    async fn completion(&self, system: &str, prompt: &str) -> Result<String, String> {
        self.prompt(system, prompt)
            .await
            .map(|r| r.content)
            .map_err(|e| e.to_string())
    }
}
