//! Error types for the agentry CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! The template engine itself (`crate::vars`) never raises: malformed schema
//! blocks degrade to "no schema" and substitution only performs literal matches.
//! Errors here come from the surrounding system: store I/O, config parsing,
//! and backend execution.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for agentry operations.
///
/// Each variant maps to a specific exit code so scripts can distinguish
/// "you asked for something that does not exist" from config or backend trouble.
#[derive(Error, Debug)]
pub enum AgentryError {
    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// A record lookup failed (agent id or share slug did not resolve).
    #[error("{0}")]
    NotFound(String),

    /// Configuration validation failed (backends.yaml / config.yaml).
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// The execution backend failed (spawn error, non-zero exit, timeout).
    #[error("Backend failed: {0}")]
    BackendError(String),
}

impl AgentryError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            AgentryError::UserError(_) => exit_codes::USER_ERROR,
            AgentryError::NotFound(_) => exit_codes::NOT_FOUND,
            AgentryError::ValidationError(_) => exit_codes::VALIDATION_FAILURE,
            AgentryError::BackendError(_) => exit_codes::BACKEND_FAILURE,
        }
    }
}

/// Result type alias for agentry operations.
pub type Result<T> = std::result::Result<T, AgentryError>;
