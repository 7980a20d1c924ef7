//! # Configuration
//!
//! Manages the loading and parsing of the optional configuration file (`config.yaml`).
//! Defines the structs for LLM providers, the companion service and the execution engine.
//! Secrets are never stored here: providers name the environment variable holding their key.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 7878;

/// Main application configuration structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub companion: CompanionConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Overrides keyed by provider name. Missing entries fall back to built-in defaults.
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
        }
    }
}

impl LlmConfig {
    /// Settings for a provider, merged over the built-in defaults for that name.
    pub fn provider(&self, name: &str) -> ProviderSettings {
        let name = name.to_lowercase();
        let base = ProviderSettings::builtin(&name);
        match self.providers.get(&name) {
            Some(custom) => ProviderSettings {
                model: custom.model.clone().or(base.model),
                endpoint: custom.endpoint.clone().or(base.endpoint),
                api_key_env: custom.api_key_env.clone().or(base.api_key_env),
                timeout: custom.timeout.or(base.timeout),
                max_tokens: custom.max_tokens.or(base.max_tokens),
            },
            None => base,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// e.g. "GEMINI_API_KEY"
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Completion length cap; provider default when unset.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl ProviderSettings {
    fn builtin(name: &str) -> Self {
        let (model, env) = match name {
            "openai" => ("gpt-4o-mini", "OPENAI_API_KEY"),
            "groq" => ("llama-3.3-70b-versatile", "GROQ_API_KEY"),
            "gemini" => ("gemini-1.5-flash", "GEMINI_API_KEY"),
            _ => return Self::default(),
        };
        Self {
            model: Some(model.to_string()),
            endpoint: None,
            api_key_env: Some(env.to_string()),
            timeout: Some(default_llm_timeout()),
            max_tokens: None,
        }
    }
}

/// Companion service location and start-up behaviour.
#[derive(Debug, Deserialize, Clone)]
pub struct CompanionConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Explicit launcher; otherwise `raze-mcp` next to the running executable.
    #[serde(default)]
    pub launcher: Option<PathBuf>,
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_ms: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            launcher: None,
            startup_timeout_ms: default_startup_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_excerpt")]
    pub read_excerpt_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            read_excerpt_chars: default_excerpt(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_llm_timeout() -> u64 {
    120
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_startup_timeout() -> u64 {
    5000
}
fn default_poll_interval() -> u64 {
    250
}
fn default_excerpt() -> usize {
    2000
}

impl AppConfig {
    /// Load from an explicit path, else the user config dir, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file is a valid, all-defaults config.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("raze").join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.llm.default_provider, "openai");
        assert_eq!(config.companion.port, DEFAULT_PORT);
        assert_eq!(config.companion.startup_timeout_ms, 5000);
        assert_eq!(config.companion.poll_interval_ms, 250);
        assert_eq!(config.engine.read_excerpt_chars, 2000);
    }

    #[test]
    fn test_partial_yaml() {
        let config = AppConfig::from_yaml(
            r#"
llm:
  default_provider: gemini
  providers:
    gemini:
      model: gemini-1.5-pro
      max_tokens: 2048
companion:
  port: 9000
"#,
        )
        .unwrap();

        assert_eq!(config.llm.default_provider, "gemini");
        assert_eq!(config.companion.port, 9000);
        assert_eq!(config.companion.poll_interval_ms, 250);

        let gemini = config.llm.provider("gemini");
        assert_eq!(gemini.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(gemini.api_key_env.as_deref(), Some("GEMINI_API_KEY"));
        assert_eq!(gemini.max_tokens, Some(2048));
        assert_eq!(config.llm.provider("openai").max_tokens, None);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = AppConfig::from_yaml("   \n").unwrap();
        assert_eq!(config.companion.port, DEFAULT_PORT);
    }

    #[test]
    fn test_unknown_provider_has_no_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider("mystery"), ProviderSettings::default());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "engine:\n  read_excerpt_chars: 10\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.engine.read_excerpt_chars, 10);

        let missing = AppConfig::load(Some(&dir.path().join("nope.yaml")));
        assert!(missing.is_err());
    }
}
