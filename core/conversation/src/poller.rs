//! Submitting a message to a thread and waiting for the assistant run.

use std::sync::Arc;
use std::time::Duration;

use openai_sdk::Client;
use openai_sdk::Clock;
use openai_sdk::Run;
use openai_sdk::RunStatus;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::error::ConversationError;
use crate::error::Result;

/// Polling policy for assistant runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between status checks.
    pub interval: Duration,
    /// Total time a run may stay unfinished.
    pub max_wait: Duration,
    /// Number of newest thread messages fetched to find the reply.
    pub message_page_size: i32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(60),
            message_page_size: 20,
        }
    }
}

impl PollConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_message_page_size(mut self, size: i32) -> Self {
        self.message_page_size = size.clamp(1, 100);
        self
    }
}

/// Drives one assistant run from submission to reply text.
///
/// Every request goes through the client's retrying transport; the poll
/// budget here is measured on the injected clock around those requests.
#[derive(Debug, Clone)]
pub struct RunPoller {
    config: PollConfig,
    clock: Arc<dyn Clock>,
}

impl RunPoller {
    pub fn new(config: PollConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Post `message` to the thread, run `assistant_id` on it and return the
    /// reply text once the run completes.
    ///
    /// Cancelling `cancel` stops polling before the next status request. The
    /// remote run is left alone.
    pub async fn submit_and_await(
        &self,
        client: &Client,
        thread_id: &str,
        assistant_id: &str,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(ConversationError::Cancelled);
        }

        client.messages().create(thread_id, message).await?;
        let run = client.runs().create(thread_id, assistant_id).await?;
        debug!(run_id = %run.id, status = %run.status, "run created");

        let run = self.await_run(client, thread_id, run, cancel).await?;
        self.fetch_reply(client, thread_id, &run.id).await
    }

    async fn await_run(
        &self,
        client: &Client,
        thread_id: &str,
        mut run: Run,
        cancel: &CancellationToken,
    ) -> Result<Run> {
        let start = self.clock.now();
        let mut polls = 0;

        loop {
            if run.status == RunStatus::Completed {
                debug!(run_id = %run.id, polls, "run completed");
                return Ok(run);
            }
            if run.status.is_terminal() {
                let message = run
                    .last_error
                    .as_ref()
                    .map(|e| e.message.clone())
                    .unwrap_or_default();
                warn!(run_id = %run.id, status = %run.status, "run did not complete: {message}");
                return Err(ConversationError::RunFailed {
                    status: run.status,
                    message,
                });
            }

            let waited = self.clock.now().saturating_duration_since(start);
            if waited >= self.config.max_wait {
                warn!(run_id = %run.id, status = %run.status, polls, "run poll budget exhausted");
                return Err(ConversationError::RunTimeout {
                    run_id: run.id,
                    waited,
                    last_status: run.status,
                });
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ConversationError::Cancelled),
                _ = self.clock.sleep(self.config.interval) => {}
            }

            run = client.runs().retrieve(thread_id, &run.id).await?;
            polls += 1;
            debug!(run_id = %run.id, status = %run.status, polls, "run polled");
        }
    }

    async fn fetch_reply(&self, client: &Client, thread_id: &str, run_id: &str) -> Result<String> {
        let page = client
            .messages()
            .list(thread_id, self.config.message_page_size)
            .await?;

        let message = page.latest_assistant_message(Some(run_id)).ok_or_else(|| {
            ConversationError::Parse(format!("run {run_id} completed without an assistant message"))
        })?;

        let text = message.text();
        if text.trim().is_empty() {
            return Err(ConversationError::Parse(format!(
                "assistant message {} has no text content",
                message.id
            )));
        }
        Ok(text)
    }
}

#[cfg(test)]
#[path = "poller.test.rs"]
mod tests;
