//! # Main Entry Point
//!
//! Parses the command line, loads configuration, sets up logging and dispatches
//! to the subcommand handlers.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use raze::domain::config::AppConfig;
use raze::domain::types::TurnConfiguration;
use raze::infrastructure::logging;
use raze::interface::commands::{ai, mcp};

/// raze -- plan-and-apply coding assistant.
#[derive(Parser, Debug)]
#[command(name = "raze", version, about)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also print logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the model for a plan and apply it (interactive without a prompt)
    Ai {
        /// The request, e.g. "make the button blue"
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,

        /// LLM provider (openai, groq, gemini)
        #[arg(long)]
        provider: Option<String>,

        /// Model override for the provider
        #[arg(long)]
        model: Option<String>,

        /// Companion service port
        #[arg(long)]
        port: Option<u16>,

        /// Apply without asking for confirmation
        #[arg(long)]
        auto: bool,

        /// Preview the plan without executing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Companion service subcommands
    Mcp {
        #[command(subcommand)]
        action: McpCommands,
    },
}

#[derive(Subcommand, Debug)]
enum McpCommands {
    /// Check whether the companion service is up
    Status {
        #[arg(long)]
        port: Option<u16>,
    },

    /// Start the companion service if it is not running
    Start {
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a shell command through the companion service
    Exec {
        #[arg(long)]
        port: Option<u16>,

        /// Working directory, relative to the service root
        #[arg(long)]
        cwd: Option<String>,

        /// Command and arguments to execute
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let _guard = match logging::init("raze.log", cli.verbose) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {:#}", e);
            None
        }
    };
    tracing::info!("Starting raze {}", env!("CARGO_PKG_VERSION"));

    let default_port = config.companion.port;
    match cli.command {
        Commands::Ai {
            prompt,
            provider,
            model,
            port,
            auto,
            dry_run,
        } => {
            let turn = TurnConfiguration {
                provider: provider.unwrap_or_else(|| config.llm.default_provider.clone()),
                model,
                port: port.unwrap_or(default_port),
                auto,
                dry_run,
            };
            ai::handle_ai(&config, turn, prompt).await
        }
        Commands::Mcp { action } => match action {
            McpCommands::Status { port } => mcp::handle_status(port.unwrap_or(default_port)).await,
            McpCommands::Start { port } => {
                mcp::handle_start(&config, port.unwrap_or(default_port)).await
            }
            McpCommands::Exec { port, cwd, command } => {
                mcp::handle_exec(&config, port.unwrap_or(default_port), cwd, command).await
            }
        },
    }
}
