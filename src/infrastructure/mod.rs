//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., LlmProvider, CompanionService).

pub mod llm;
pub mod logging;
pub mod mcp;
