//! # MCP Module
//!
//! The companion file service: the HTTP client `raze` talks to, and the
//! workspace-sandboxed server shipped as the `raze-mcp` binary.

pub mod client;
pub mod server;
pub mod workspace;

pub use client::{McpClient, SharedCompanion};
pub use workspace::Workspace;
