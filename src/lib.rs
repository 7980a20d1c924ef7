//! # raze
//!
//! Turns a natural-language request into a JSON action plan via an LLM, and runs
//! that plan against a local companion file service (`raze-mcp`).
//!
//! - Domain: plan types, configuration, traits and errors
//! - Application: plan parsing, edit resolution, service supervision, execution
//! - Infrastructure: LLM providers, the companion client and server, logging
//! - Interface: console terminal and subcommand handlers

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod strings;
