//! Chat completions resource.

use crate::client::ApiFamily;
use crate::client::Client;
use crate::error::OpenAIError;
use crate::error::Result;
use crate::types::ChatCompletion;
use crate::types::ChatCompletionParams;

/// Chat completions resource.
pub struct Chat<'a> {
    client: &'a Client,
}

impl<'a> Chat<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create a chat completion.
    pub async fn create(&self, params: ChatCompletionParams) -> Result<ChatCompletion> {
        let body = serde_json::to_value(&params).map_err(|e| {
            OpenAIError::Configuration(format!("failed to serialize request: {e}"))
        })?;

        self.client
            .post("/chat/completions", body, ApiFamily::Chat, "chatCompletion")
            .await
    }
}
