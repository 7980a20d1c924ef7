//! # MCP Commands
//!
//! `raze mcp status|start|exec`: inspect, launch and use the companion service.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::application::supervisor::AvailabilitySupervisor;
use crate::domain::config::AppConfig;
use crate::domain::traits::{CompanionService, Terminal, Tone};
use crate::infrastructure::mcp::{McpClient, SharedCompanion};
use crate::interface::console::ConsoleTerminal;
use crate::strings::messages;

pub async fn handle_status(port: u16) -> Result<()> {
    let terminal = ConsoleTerminal::new();
    let healthy = McpClient::new(port).health().await;
    let tone = if healthy { Tone::Success } else { Tone::Warning };
    terminal.print(tone, &messages::service_status(port, healthy));
    Ok(())
}

fn supervisor_for(app: &AppConfig, port: u16) -> Result<AvailabilitySupervisor> {
    let service: SharedCompanion = Arc::new(McpClient::new(port));
    let root = std::env::current_dir().context("Failed to resolve working directory")?;
    Ok(AvailabilitySupervisor::from_config(service, &app.companion, &root))
}

pub async fn handle_start(app: &AppConfig, port: u16) -> Result<()> {
    let terminal = ConsoleTerminal::new();
    let supervisor = supervisor_for(app, port)?;

    if supervisor.ensure_available().await {
        terminal.print(Tone::Success, &messages::service_status(port, true));
    } else {
        terminal.print(Tone::Error, &messages::service_unavailable(port));
    }
    Ok(())
}

pub async fn handle_exec(
    app: &AppConfig,
    port: u16,
    cwd: Option<String>,
    command: Vec<String>,
) -> Result<()> {
    let terminal = ConsoleTerminal::new();
    if !supervisor_for(app, port)?.ensure_available().await {
        terminal.print(Tone::Error, &messages::service_unavailable(port));
        return Ok(());
    }

    let command = command.join(" ");
    match McpClient::new(port)
        .execute_command(&command, cwd.as_deref())
        .await
    {
        Ok(output) => {
            if !output.stdout.is_empty() {
                terminal.print(Tone::Plain, output.stdout.trim_end());
            }
            if !output.stderr.is_empty() {
                terminal.print(Tone::Warning, output.stderr.trim_end());
            }
            let tone = if output.success() { Tone::Muted } else { Tone::Error };
            terminal.print(tone, &messages::command_exit(output.exit_code));
        }
        Err(e) => {
            tracing::warn!("Command failed: {}", e);
            terminal.print(Tone::Error, &e.to_string());
        }
    }
    Ok(())
}
