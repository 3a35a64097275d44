//! Runs resource.

use crate::client::ApiFamily;
use crate::client::Client;
use crate::error::OpenAIError;
use crate::error::Result;
use crate::types::CreateRunParams;
use crate::types::Run;

/// Runs resource.
pub struct Runs<'a> {
    client: &'a Client,
}

impl<'a> Runs<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Start a run of `assistant_id` on a thread.
    pub async fn create(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let params = CreateRunParams {
            assistant_id: assistant_id.to_string(),
        };
        let body = serde_json::to_value(&params).map_err(|e| {
            OpenAIError::Configuration(format!("failed to serialize request: {e}"))
        })?;

        self.client
            .post(
                &format!("/threads/{thread_id}/runs"),
                body,
                ApiFamily::Assistants,
                "createRun",
            )
            .await
    }

    /// Retrieve the current state of a run.
    pub async fn retrieve(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.client
            .get(
                &format!("/threads/{thread_id}/runs/{run_id}"),
                ApiFamily::Assistants,
                "getRun",
            )
            .await
    }
}
