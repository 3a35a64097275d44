//! Assistants API types: threads, thread messages and runs.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::chat::Role;

/// A server-side conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Thread {
    /// Thread ID (e.g. "thread_abc123").
    pub id: String,
    /// Creation time (Unix seconds).
    #[serde(default)]
    pub created_at: i64,
}

/// Parameters for `POST /threads/{thread_id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateMessageParams {
    pub role: Role,
    pub content: String,
}

impl CreateMessageParams {
    /// A user message carrying `content`.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A message stored on a thread.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThreadMessage {
    /// Message ID.
    pub id: String,
    /// Owning thread.
    #[serde(default)]
    pub thread_id: String,
    /// Author role.
    pub role: Role,
    /// Content parts.
    #[serde(default)]
    pub content: Vec<MessageContent>,
    /// Run that produced this message, for assistant messages.
    #[serde(default)]
    pub run_id: Option<String>,
    /// Creation time (Unix seconds).
    #[serde(default)]
    pub created_at: i64,
}

impl ThreadMessage {
    /// Concatenated text parts, separated by blank lines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value.as_str()),
                MessageContent::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// One content part of a thread message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    /// Text part.
    Text { text: MessageTextContent },
    /// Images, file references and other non-text parts.
    #[serde(other)]
    Other,
}

/// Text payload of a content part.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageTextContent {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<serde_json::Value>,
}

/// Page of thread messages (`GET /threads/{thread_id}/messages`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub data: Vec<ThreadMessage>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl MessageList {
    /// Newest assistant message, preferring one produced by `run_id`.
    ///
    /// Assumes the page is ordered newest first (`order=desc`).
    pub fn latest_assistant_message(&self, run_id: Option<&str>) -> Option<&ThreadMessage> {
        let mut assistant = self
            .data
            .iter()
            .filter(|message| message.role == Role::Assistant);

        match run_id {
            Some(run_id) => {
                let fallback = assistant.clone().next();
                assistant
                    .find(|message| message.run_id.as_deref() == Some(run_id))
                    .or(fallback)
            }
            None => assistant.next(),
        }
    }
}

/// Parameters for `POST /threads/{thread_id}/runs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRunParams {
    pub assistant_id: String,
}

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// Any status this SDK does not know yet.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether the run has stopped and will not change again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Completed
                | RunStatus::Failed
                | RunStatus::Cancelled
                | RunStatus::Expired
                | RunStatus::Incomplete
        )
    }

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported on a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// A unit of work the assistant performs on a thread.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Run {
    /// Run ID.
    pub id: String,
    /// Thread the run belongs to.
    #[serde(default)]
    pub thread_id: String,
    /// Assistant executing the run.
    #[serde(default)]
    pub assistant_id: String,
    /// Current status.
    pub status: RunStatus,
    /// Failure details, set when status is `failed`.
    #[serde(default)]
    pub last_error: Option<RunError>,
}

#[cfg(test)]
#[path = "assistants.test.rs"]
mod tests;
