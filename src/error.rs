//! Error types for the inkpost library.

use thiserror::Error;

/// Errors produced by the cache wrapper, transport, session store and config.
#[derive(Debug, Error)]
pub enum InkpostError {
    /// Configuration could not be read, parsed or validated.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failure (session or config files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: serde_json::Value },

    /// The backend rejected the session (401 or 403). The stored token has
    /// already been cleared when this is returned.
    #[error("Unauthorized (status {status}); session cleared")]
    Unauthorized { status: u16 },

    /// Payload (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller built a request the transport cannot send.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl InkpostError {
    /// HTTP status carried by this error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Unauthorized { status } => Some(*status),
            _ => None,
        }
    }

    /// Backend-provided `error` message, when the body carries one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => body["error"].as_str().or_else(|| body["message"].as_str()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for InkpostError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, InkpostError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_accessor() {
        let err = InkpostError::Status {
            status: 404,
            body: json!({"error": "Post not found"}),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.backend_message(), Some("Post not found"));

        let err = InkpostError::Unauthorized { status: 401 };
        assert_eq!(err.status(), Some(401));
        assert!(err.backend_message().is_none());

        let err = InkpostError::Http("connection refused".into());
        assert!(err.status().is_none());
    }

    #[test]
    fn test_backend_message_falls_back_to_message_field() {
        let err = InkpostError::Status {
            status: 400,
            body: json!({"message": "Title is required"}),
        };
        assert_eq!(err.backend_message(), Some("Title is required"));
    }

    #[test]
    fn test_display() {
        let err = InkpostError::Config("bad base url".into());
        assert_eq!(err.to_string(), "Configuration error: bad base url");
        let err = InkpostError::Unauthorized { status: 403 };
        assert_eq!(err.to_string(), "Unauthorized (status 403); session cleared");
    }
}
