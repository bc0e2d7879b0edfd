//! Error types for worldgen
//!
//! The taxonomy separates failures the caller can do something about
//! (missing credentials, bad input paths) from service-side conditions.
//! Only `Transient` is ever retried; after retries are exhausted it is
//! escalated to `Fatal` by the HTTP layer.

use thiserror::Error;

/// The main error type for worldgen operations
#[derive(Debug, Error)]
pub enum WorldgenError {
    /// Missing or rejected credentials. Never retried.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Bad local input: missing image paths, empty image directory.
    #[error("Input error: {0}")]
    Input(String),

    /// Retryable network or service condition (rate limit, 5xx, connect failure).
    #[error("Transient service error: {0}")]
    Transient(String),

    /// Any other non-retryable request failure.
    #[error("Request failed: {0}")]
    Fatal(String),

    /// The polling loop exceeded its overall budget.
    #[error("Timed out waiting for operation {operation_id} after {waited_secs:.1}s")]
    Timeout {
        operation_id: String,
        waited_secs: f64,
    },

    /// The remote service reported the generation failed; carries the
    /// remote-provided reason verbatim.
    #[error("Generation failed: {0}")]
    JobFailed(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

/// Result type alias for worldgen operations
pub type Result<T> = std::result::Result<T, WorldgenError>;

impl WorldgenError {
    /// Exit code for the CLI surface: 2 for configuration/input problems the
    /// user must fix before anything is sent, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            WorldgenError::Auth(_) | WorldgenError::Input(_) | WorldgenError::Config(_) => 2,
            _ => 1,
        }
    }

    /// Whether this error may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, WorldgenError::Transient(_))
    }
}

impl From<serde_json::Error> for WorldgenError {
    fn from(err: serde_json::Error) -> Self {
        WorldgenError::Json(err.to_string())
    }
}
