//! CLI error types

use magpt_api::ApiError;
use magpt_config::ConfigError;
use magpt_session::SessionError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Command not found: {command}. Did you mean: {suggestion}?")]
    CommandNotFound { command: String, suggestion: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        CliError::Api(err.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Config(e) => e.into(),
            SessionError::Api(e) => e.into(),
            other => CliError::Session(other.to_string()),
        }
    }
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::CommandNotFound {
                command,
                suggestion,
            } => {
                format!(
                    "Command '{}' not found. Did you mean {}?\nType /help for available commands.",
                    command, suggestion
                )
            }
            CliError::InvalidArgument { message } => {
                format!("{}\nType /help for usage.", message)
            }
            CliError::Io(e) => format!("File operation failed: {}", e),
            CliError::Config(msg) => format!("{}\nType /settings to see current values.", msg),
            CliError::Api(msg) => format!("Could not reach the API: {}", msg),
            CliError::Session(msg) => msg.clone(),
            CliError::Clipboard(msg) => format!("Could not copy to clipboard: {}", msg),
            CliError::Internal(msg) => format!("Internal error: {}\n\nPlease report this issue.", msg),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
