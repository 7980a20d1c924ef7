//! # Application Layer
//!
//! Turn orchestration: recovering a plan from model output, resolving edits,
//! keeping the companion service available and executing plans against it.

pub mod assistant;
pub mod edit;
pub mod engine;
pub mod parsing;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;
