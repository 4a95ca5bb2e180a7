//! Structured error types for the AI command pipeline
//!
//! Classification and context gathering never fail; everything that talks to
//! the network or spawns a process reports through `CoreError`.

use thiserror::Error;

/// Primary error type for pipeline operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// The agent service did not pass its health probe or is not initialized
    #[error("agent service unavailable at {base_url}")]
    ConnectorUnavailable { base_url: String },

    /// A generate/stream call failed mid-flight
    #[error("agent invocation failed: {message}")]
    AgentInvocation { message: String },

    /// The execution collaborator refused a deny-listed command
    #[error("command rejected: {reason}")]
    ExecutionRejected { reason: String },

    /// A command string could not be parsed into shell words
    #[error("invalid command: {message}")]
    InvalidCommand { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Check if the error is transient and worth retrying on the next submission
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectorUnavailable { .. } => true,
            Self::AgentInvocation { .. } => true,
            Self::Http(_) => true,
            Self::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::TimedOut
            ),
            Self::ExecutionRejected { .. } | Self::InvalidCommand { .. } | Self::Json(_) => false,
        }
    }

    /// Get a one-line message suitable for the terminal
    pub fn user_message(&self) -> String {
        match self {
            Self::ConnectorUnavailable { base_url } => {
                format!("agent service is not reachable ({base_url}), is it running?")
            }
            Self::ExecutionRejected { reason } => {
                format!("refused to run this command: {reason}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;
