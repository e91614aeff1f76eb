//! Session error types

use magpt_api::ApiError;
use magpt_config::ConfigError;
use thiserror::Error;

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by settings actions
///
/// Connectivity and generation failures never reach callers as errors; they
/// are reported through status text and notices instead.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// Selected model is not in the loaded catalog
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Selected model is listed but disabled
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// No message at that transcript position
    #[error("No message #{0}")]
    NoSuchMessage(usize),
}
