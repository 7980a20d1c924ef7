//! # Domain Errors
//!
//! Typed failures that cross layer boundaries. Everything else travels as `anyhow::Error`.

use thiserror::Error;

/// Why model output could not be turned into a plan.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no JSON object found in model output")]
    NoCandidate,
    #[error("model output is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("JSON object has no `actions` array")]
    MissingActions,
    #[error("plan contains an unsupported action: {0}")]
    InvalidAction(String),
}

/// Failure talking to the companion service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("companion service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("companion service unreachable: {0}")]
    Transport(String),
    #[error("unexpected response from companion service: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}
