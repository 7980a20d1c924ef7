//! # Command Handlers
//!
//! One module per top-level subcommand (`raze ai`, `raze mcp`).
//! Handlers report problems on the terminal and only return errors for setup failures.

pub mod ai;
pub mod mcp;
