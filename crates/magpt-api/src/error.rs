//! API client error types

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// API client errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request did not complete in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport failure (connection refused, DNS, reset, ...)
    #[error("{0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("HTTP {}{}", .status, detail_suffix(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Base URL and path did not form a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

impl ApiError {
    /// Map a reqwest failure; `timeout` is the limit that was in force
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Option<Duration>) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout.unwrap_or_default())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }

    /// Whether the request was abandoned because it took too long
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout(_))
    }

    /// HTTP status, when the backend answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-supplied detail message, when present
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            detail: None,
        };
        assert_eq!(err.to_string(), "HTTP 503 Service Unavailable");

        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: Some("OOM".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error: OOM");
        assert_eq!(err.detail(), Some("OOM"));
    }

    #[test]
    fn test_classification() {
        assert!(ApiError::Timeout(Duration::from_secs(5)).is_timeout());
        assert!(!ApiError::Network("refused".to_string()).is_timeout());
        assert_eq!(ApiError::Network("refused".to_string()).status(), None);
    }
}
