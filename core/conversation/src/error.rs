//! Error types for conversation calls.

use std::time::Duration;

use openai_sdk::OpenAIError;
use openai_sdk::RunStatus;
use thiserror::Error;

/// Result type alias using ConversationError.
pub type Result<T> = std::result::Result<T, ConversationError>;

/// Everything that can stop a conversation call from producing a reply.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// Network or HTTP failure after the transport gave up retrying.
    #[error(transparent)]
    Transport(OpenAIError),

    /// A response was missing the data a reply needs.
    #[error("malformed response: {0}")]
    Parse(String),

    /// The assistant run stopped in a non-success state.
    #[error("run ended with status {status}: {message}")]
    RunFailed {
        /// Terminal status reported by the service.
        status: RunStatus,
        /// Error detail from the run, possibly empty.
        message: String,
    },

    /// The assistant run did not finish within the poll budget.
    #[error("run {run_id} still {last_status} after {waited:?}")]
    RunTimeout {
        run_id: String,
        waited: Duration,
        last_status: RunStatus,
    },

    /// Required settings are missing; detected before any network call.
    #[error("{0}")]
    Configuration(String),

    /// The caller cancelled the call.
    #[error("request cancelled")]
    Cancelled,
}

impl From<OpenAIError> for ConversationError {
    fn from(error: OpenAIError) -> Self {
        match error {
            OpenAIError::Configuration(message) => ConversationError::Configuration(message),
            OpenAIError::Parse { .. } => ConversationError::Parse(error.to_string()),
            other => ConversationError::Transport(other),
        }
    }
}

impl ConversationError {
    /// Whether the service reported a missing thread (HTTP 404 on a thread
    /// endpoint), meaning a cached thread id is stale.
    ///
    /// `createRun` is excluded: it also answers 404 for an unknown assistant,
    /// and the thread is still valid then.
    pub fn is_thread_missing(&self) -> bool {
        match self {
            ConversationError::Transport(error) => {
                error.status() == Some(404)
                    && matches!(
                        error.operation(),
                        Some("postMessage" | "getRun" | "listMessages")
                    )
            }
            _ => false,
        }
    }

    /// Single non-technical message for the person asking.
    pub fn user_message(&self) -> String {
        match self {
            ConversationError::Transport(error) => match error.status() {
                Some(401) => {
                    "The OpenAI API key was rejected. Please check it in the settings.".to_string()
                }
                Some(404) => "The model, assistant or conversation was not found. \
                              Please check the settings."
                    .to_string(),
                Some(429) => "The AI service is busy or your quota is exhausted. \
                              Please try again in a moment."
                    .to_string(),
                Some(status) if status >= 500 => {
                    "The AI service is having trouble. Please try again later.".to_string()
                }
                Some(_) => "The AI service could not process this request.".to_string(),
                None => "Could not reach the AI service. Please check your connection.".to_string(),
            },
            ConversationError::Parse(_) => {
                "The AI service returned a reply that could not be read.".to_string()
            }
            ConversationError::RunFailed { status, .. } => {
                format!("The assistant could not finish this request (run {status}).")
            }
            ConversationError::RunTimeout { .. } => {
                "The assistant took too long to answer. Please try again.".to_string()
            }
            ConversationError::Configuration(message) => message.clone(),
            ConversationError::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
