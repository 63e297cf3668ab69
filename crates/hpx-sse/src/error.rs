//! Error handling for the SSE client.

use thiserror::Error;

/// The main result type used throughout the crate.
pub type SseResult<T> = Result<T, SseError>;

/// Errors produced while configuring or driving an SSE connection.
///
/// Only [`SseError::Config`] is ever returned to the consumer of an
/// [`SseStream`](crate::SseStream). Every other variant describes a failed
/// connection attempt and is fed into the reconnection policy instead.
#[derive(Error, Debug)]
pub enum SseError {
    /// Invalid configuration, raised at construction time.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP request errors (wraps reqwest::Error)
    #[cfg(feature = "reqwest")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The transport could not establish a connection.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The server answered with a non-success status code.
    #[error("Unexpected SSE response status: {status}")]
    InvalidStatus { status: http::StatusCode },

    /// The server answered without a readable body.
    #[error("SSE response has no body")]
    MissingBody,

    /// Reading from an established stream failed.
    #[error("SSE stream error: {message}")]
    Stream { message: String },

    /// Connection establishment did not finish in time.
    #[error("Connection timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },
}

impl SseError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a stream read error.
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    /// Create an invalid status error.
    pub fn invalid_status(status: http::StatusCode) -> Self {
        Self::InvalidStatus { status }
    }

    /// Create a timeout error.
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Returns `true` for errors raised while validating configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SseError::config("Invalid URL");
        assert!(matches!(err, SseError::Config { .. }));
        assert!(err.is_config());

        let err = SseError::timeout(std::time::Duration::from_secs(5));
        assert!(matches!(err, SseError::Timeout { .. }));
        assert!(!err.is_config());

        let err = SseError::invalid_status(http::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            err.to_string(),
            "Unexpected SSE response status: 503 Service Unavailable"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            SseError::stream("connection reset").to_string(),
            "SSE stream error: connection reset"
        );
        assert_eq!(
            SseError::MissingBody.to_string(),
            "SSE response has no body"
        );
    }
}
