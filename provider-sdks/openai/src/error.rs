//! Error types for the OpenAI SDK.

use thiserror::Error;

/// Result type alias using OpenAIError.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// Errors that can occur when talking to the OpenAI API.
///
/// Transport failures carry the operation label of the request that failed
/// so that a single log line is enough to tell which step broke.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Client configuration is invalid (missing key, unusable header value).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never produced an HTTP response.
    #[error("network error during {operation}: {message}")]
    Network {
        /// Operation label of the failed request.
        operation: String,
        /// Display output of the underlying transport error.
        message: String,
    },

    /// The API answered with a non-success status.
    #[error("{operation} failed with HTTP {status}: {message}")]
    Api {
        /// Operation label of the failed request.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
        /// Request ID from the `x-request-id` header, if present.
        request_id: Option<String>,
    },

    /// A success response carried a body that could not be decoded.
    #[error("failed to parse {operation} response: {message}")]
    Parse {
        /// Operation label of the request.
        operation: String,
        /// Decoder error message.
        message: String,
    },
}

impl OpenAIError {
    /// Check if this error is retryable.
    ///
    /// Returns `true` for transient errors that may succeed on retry:
    /// - `Network` (connection issues, timeouts)
    /// - `Api` with HTTP 429 (rate limiting)
    /// - `Api` with HTTP 5xx (server-side failures)
    pub fn is_retryable(&self) -> bool {
        match self {
            OpenAIError::Network { .. } => true,
            OpenAIError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    /// HTTP status of the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            OpenAIError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Operation label of the failed request, if the error came from a request.
    pub fn operation(&self) -> Option<&str> {
        match self {
            OpenAIError::Network { operation, .. }
            | OpenAIError::Api { operation, .. }
            | OpenAIError::Parse { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Short status label for diagnostics: the HTTP status or `network`.
    pub fn status_label(&self) -> String {
        match self {
            OpenAIError::Api { status, .. } => status.to_string(),
            OpenAIError::Network { .. } => "network".to_string(),
            OpenAIError::Parse { .. } => "parse".to_string(),
            OpenAIError::Configuration(_) => "configuration".to_string(),
        }
    }

    pub(crate) fn network(operation: &str, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timeout: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        OpenAIError::Network {
            operation: operation.to_string(),
            message,
        }
    }
}

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
