//! Error types for Vitalia
//!
//! The evaluation core (classification, risk, narratives, trend, routing) is
//! total and never fails. These errors only surface at the boundaries:
//! ingest parsing, chat bodies, configuration and persistence.

use thiserror::Error;

/// Errors that can occur at the edges of the engine
#[derive(Debug, Error)]
pub enum VitalError {
    #[error("Failed to parse device payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
