use std::fmt;

/// Unified error type for the crow crate.
#[derive(Debug, Clone)]
pub enum AgentError {
    /// Missing or invalid start-up configuration.
    Config(String),
    /// Failure talking to the remote generation API.
    Remote(String),
    /// Failure reading or writing persisted state.
    Storage(String),
    /// Failure performing an OS automation primitive.
    Automation(String),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::Config(msg) => write!(f, "configuration error: {msg}"),
            AgentError::Remote(msg) => write!(f, "remote error: {msg}"),
            AgentError::Storage(msg) => write!(f, "storage error: {msg}"),
            AgentError::Automation(msg) => write!(f, "automation error: {msg}"),
        }
    }
}

impl std::error::Error for AgentError {}

/// Result type alias using [`AgentError`].
pub type AgentResult<T> = Result<T, AgentError>;
