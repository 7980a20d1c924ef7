//! Simple LLM API wrapper for multiple providers
//!
//! This module provides a unified interface for the chat-completion backends the
//! assistant can plan with (OpenAI, Groq, Gemini).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use raze::domain::config::AppConfig;
//! use raze::domain::traits::LlmProvider;
//! use raze::infrastructure::llm::Client;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let client = Client::from_config(&config.llm, "openai", None)?;
//! let text = client.completion("Reply with JSON.", "make the button blue").await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod providers;
mod types;

pub use client::Client;

pub use types::{Context, Error, Message, MessageRole, Provider, Response, TokenUsage};
