//! Thread messages resource.

use crate::client::ApiFamily;
use crate::client::Client;
use crate::error::OpenAIError;
use crate::error::Result;
use crate::types::CreateMessageParams;
use crate::types::MessageList;
use crate::types::ThreadMessage;

/// Thread messages resource.
pub struct Messages<'a> {
    client: &'a Client,
}

impl<'a> Messages<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Append a user message to a thread.
    pub async fn create(&self, thread_id: &str, content: &str) -> Result<ThreadMessage> {
        let body = serde_json::to_value(CreateMessageParams::user(content)).map_err(|e| {
            OpenAIError::Configuration(format!("failed to serialize request: {e}"))
        })?;

        self.client
            .post(
                &format!("/threads/{thread_id}/messages"),
                body,
                ApiFamily::Assistants,
                "postMessage",
            )
            .await
    }

    /// List the newest `limit` messages of a thread, newest first.
    pub async fn list(&self, thread_id: &str, limit: i32) -> Result<MessageList> {
        self.client
            .get(
                &format!("/threads/{thread_id}/messages?order=desc&limit={limit}"),
                ApiFamily::Assistants,
                "listMessages",
            )
            .await
    }
}
