//! # Domain Traits
//!
//! Abstract interfaces for the collaborators of the execution engine (LLM, companion
//! service, terminal). Infrastructure and interface layers provide the implementations.

use async_trait::async_trait;

use crate::domain::errors::ServiceError;
use crate::domain::types::{CommandOutput, FileContent};

/// Abstract interface for an LLM Provider
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion from a system instruction and a user prompt
    async fn completion(&self, system: &str, prompt: &str) -> Result<String, String>;
}

/// The local file/command daemon actions are delegated to.
#[async_trait]
pub trait CompanionService: Send + Sync {
    /// `None` on any failure.
    async fn read_file(&self, path: &str) -> Option<FileContent>;

    async fn write_file(&self, path: &str, content: &str)
    -> Result<serde_json::Value, ServiceError>;

    /// `None` on any failure.
    async fn list_directory(&self, path: &str) -> Option<serde_json::Value>;

    async fn execute_command(
        &self,
        command: &str,
        cwd: Option<&str>,
    ) -> Result<CommandOutput, ServiceError>;

    /// True only when the service answers with `status: "ok"`.
    async fn health(&self) -> bool;

    /// Port the service is expected on, for user guidance.
    fn port(&self) -> u16;
}

/// How a line of terminal output should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Heading,
    Info,
    Success,
    Warning,
    Error,
    Muted,
}

/// Abstract interface for the user's terminal (console, or a recorder in tests)
pub trait Terminal: Send + Sync {
    /// Print one block of text
    fn print(&self, tone: Tone, text: &str);

    /// Ask a yes/no question
    fn confirm(&self, question: &str, default: bool) -> anyhow::Result<bool>;

    /// Read one line of input. `None` means end of input.
    fn read_line(&self, prompt: &str) -> anyhow::Result<Option<String>>;
}
