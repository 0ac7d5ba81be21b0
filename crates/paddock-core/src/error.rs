//! Unified error types for Paddock

use thiserror::Error;

/// Unified error type for all Paddock operations
#[derive(Error, Debug)]
pub enum PaddockError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Authentication errors - terminal until credentials are reset
    #[error("Authentication failed: {0}")]
    Auth(String),

    // Transport errors - network/timeout, safe to retry
    #[error("Transport error: {0}")]
    Transport(String),

    // Protocol errors - unexpected response shape from the backend
    #[error("Protocol error: {0}")]
    Protocol(String),

    // Non-auth HTTP failures from resource calls
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    // Operations on a closed connection
    #[error("Connection is closed")]
    Closed,

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl PaddockError {
    /// Whether retrying the identical call can succeed without intervention.
    ///
    /// Transport failures leave all client state untouched, so the caller may
    /// simply re-issue the request. Authentication failures require new
    /// credentials first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaddockError::Transport(_))
    }
}

/// Result type alias using PaddockError
pub type Result<T> = std::result::Result<T, PaddockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_is_retryable() {
        assert!(PaddockError::Transport("timeout".to_string()).is_retryable());
        assert!(!PaddockError::Auth("bad credentials".to_string()).is_retryable());
        assert!(!PaddockError::Closed.is_retryable());
    }

    #[test]
    fn test_api_error_display() {
        let err = PaddockError::Api {
            status: 404,
            message: "dataset not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error 404: dataset not found");
    }
}
