//! # Interface Layer
//!
//! The user-facing surface: the console terminal and the subcommand handlers
//! that wire configuration, infrastructure and the application layer together.

pub mod commands;
pub mod console;
