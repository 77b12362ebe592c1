use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Empty or missing question. Reported to the caller as-is, never folded
    /// into a failure response.
    #[error("Invalid question: {0}")]
    ClientInput(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, AgentError::ClientInput(_))
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
