//! Threads resource.

use crate::client::ApiFamily;
use crate::client::Client;
use crate::error::Result;
use crate::types::Thread;

/// Threads resource.
pub struct Threads<'a> {
    client: &'a Client,
}

impl<'a> Threads<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create an empty thread.
    pub async fn create(&self) -> Result<Thread> {
        self.client
            .post(
                "/threads",
                serde_json::json!({}),
                ApiFamily::Assistants,
                "createThread",
            )
            .await
    }
}
