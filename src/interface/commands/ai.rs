//! # AI Command
//!
//! `raze ai [prompt...]`: one turn for a prompt given on the command line, or an
//! interactive session when none is given.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::application::assistant::Assistant;
use crate::application::engine::ExecutionEngine;
use crate::application::supervisor::AvailabilitySupervisor;
use crate::domain::config::AppConfig;
use crate::domain::traits::{LlmProvider, Terminal};
use crate::domain::types::{SessionState, TurnConfiguration};
use crate::infrastructure::llm::Client as LlmClient;
use crate::infrastructure::mcp::{McpClient, SharedCompanion};
use crate::interface::console::ConsoleTerminal;

/// Stands in for a provider that could not be set up (unknown name, missing key),
/// so the failure is reported per turn like any other LLM error.
struct UnconfiguredLlm {
    reason: String,
}

#[async_trait]
impl LlmProvider for UnconfiguredLlm {
    async fn completion(&self, _system: &str, _prompt: &str) -> Result<String, String> {
        Err(self.reason.clone())
    }
}

fn build_llm(app: &AppConfig, turn: &TurnConfiguration) -> Arc<dyn LlmProvider> {
    match LlmClient::from_config(&app.llm, &turn.provider, turn.model.as_deref()) {
        Ok(client) => {
            tracing::info!(
                "Using {} with model {}",
                client.provider().as_str(),
                client.model()
            );
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!("LLM provider unavailable: {}", e);
            Arc::new(UnconfiguredLlm {
                reason: e.to_string(),
            })
        }
    }
}

pub async fn handle_ai(app: &AppConfig, turn: TurnConfiguration, prompt: Vec<String>) -> Result<()> {
    let terminal: Arc<dyn Terminal> = Arc::new(ConsoleTerminal::new());
    let service: SharedCompanion = Arc::new(McpClient::new(turn.port));
    let root = std::env::current_dir().context("Failed to resolve working directory")?;

    let supervisor = Arc::new(AvailabilitySupervisor::from_config(
        service.clone(),
        &app.companion,
        &root,
    ));
    let engine = ExecutionEngine::new(service.clone(), supervisor, terminal.clone())
        .with_excerpt_chars(app.engine.read_excerpt_chars);
    let assistant = Assistant::new(build_llm(app, &turn), engine, service, terminal);

    let mut session = SessionState::new();
    let request = prompt.join(" ");
    if request.trim().is_empty() {
        assistant.run_interactive(&turn, &mut session).await;
    } else {
        let outcome = assistant.handle(request.trim(), &turn, &mut session).await;
        tracing::debug!("Turn outcome: {:?}", outcome);
    }
    Ok(())
}
