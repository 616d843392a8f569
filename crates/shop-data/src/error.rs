//! HTTP client error types.

use thiserror::Error;

/// Errors that can occur when making HTTP requests.
///
/// Cloneable so a single failure can be handed to several waiters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Failed to send the request (connection refused, DNS, TLS...).
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request exceeded the client timeout ceiling.
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl FetchError {
    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the server rejected the request as unauthenticated.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::JsonError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_http_errors() {
        let err = FetchError::HttpError {
            status: 404,
            message: "missing".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(FetchError::Timeout(30_000).status(), None);
    }

    #[test]
    fn test_classification() {
        let unauthorized = FetchError::HttpError {
            status: 401,
            message: String::new(),
        };
        assert!(unauthorized.is_unauthorized());
        assert!(!FetchError::RequestError("refused".into()).is_unauthorized());
        assert!(!FetchError::Timeout(10).is_unauthorized());
    }
}
