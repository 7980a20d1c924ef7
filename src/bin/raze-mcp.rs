//! Companion file service for raze: serves one workspace directory over HTTP on
//! localhost so the CLI can read, write and list files and run commands there.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use raze::domain::config::DEFAULT_PORT;
use raze::infrastructure::logging;
use raze::infrastructure::mcp::{Workspace, server};

#[derive(Parser, Debug)]
#[command(name = "raze-mcp", version, about = "Companion file service for raze")]
struct Args {
    /// Port to listen on (127.0.0.1 only)
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Workspace root; paths outside it are rejected
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Seconds before a command run through /execute_command is killed
    #[arg(long, default_value_t = 120)]
    command_timeout: u64,

    /// Also print logs to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _guard = match logging::init("raze-mcp.log", args.verbose) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {:#}", e);
            None
        }
    };

    let workspace = Workspace::new(&args.root, Duration::from_secs(args.command_timeout))?;
    server::start_server(workspace, args.port).await
}
