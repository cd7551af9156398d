//! Error types for cogscore
//!
//! Decoders never fail: malformed task data is a defined degenerate case.
//! These errors only surface from the layers around them (parsing survey
//! response exports, loading scoring plans, resolving task identifiers).

use thiserror::Error;

/// Errors that can occur while preparing or orchestrating scoring
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown task identifier: {0}")]
    UnknownTask(String),

    #[error("Invalid scoring plan: {0}")]
    InvalidPlan(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}
