//! Error types for the finance action server

use thiserror::Error;

/// Result type alias for action server operations
pub type Result<T> = std::result::Result<T, ActionServerError>;

#[derive(Error, Debug)]
pub enum ActionServerError {

    // =============================
    // Backend Errors
    // =============================

    #[error("Backend returned {status} for {endpoint}: {body}")]
    BackendStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Invalid backend response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    // =============================
    // Dispatch Errors
    // =============================

    #[error("No registered action found for name '{0}'.")]
    ActionNotFound(String),

    #[error("Action execution failed: {0}")]
    ActionFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Failure modes of the language-model CLI invocation
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{program} exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{0} binary not found")]
    NotFound(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
