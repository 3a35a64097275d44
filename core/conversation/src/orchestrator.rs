//! Conversation entry point: route selection, both reply paths, reset.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use askgpt_config::ConfigMode;
use askgpt_config::RequestConfig;
use openai_sdk::ChatCompletionParams;
use openai_sdk::ChatMessage;
use openai_sdk::Client;
use openai_sdk::ClientConfig;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::ConversationError;
use crate::error::Result;
use crate::formatter::ReplyFormat;
use crate::history::HistoryStore;
use crate::license::LicenseStatus;
use crate::license::LicenseValidator;
use crate::license::MANAGED_REQUIRES_ASSISTANT;
use crate::license::PendingLicenseValidator;
use crate::poller::PollConfig;
use crate::poller::RunPoller;
use crate::thread_cache::ThreadCache;
use crate::thread_cache::short_id;

/// Message for a personal configuration without an API key.
pub const MISSING_API_KEY: &str =
    "Please configure your OpenAI API key in the settings (or set OPENAI_API_KEY).";

/// Message for managed mode without a license code.
pub const MISSING_LICENSE: &str = "Please enter your premium license code in the settings.";

/// Path a call takes, decided from its configuration.
#[derive(Clone, PartialEq, Eq)]
pub enum Route {
    /// Chat completions with client-side history.
    Stateless { credential: String },
    /// Assistant run on a cached server-side thread.
    Stateful {
        credential: String,
        assistant_id: String,
    },
    /// No request is made; the advisory is shown instead.
    Advisory(String),
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Stateless { .. } => f.write_str("Stateless"),
            Route::Stateful { assistant_id, .. } => f
                .debug_struct("Stateful")
                .field("assistant_id", assistant_id)
                .finish(),
            Route::Advisory(advisory) => f.debug_tuple("Advisory").field(advisory).finish(),
        }
    }
}

/// Result of a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Formatted model reply.
    Message(String),
    /// User-facing notice produced instead of a reply.
    Advisory(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Message(text) | Reply::Advisory(text) => text,
        }
    }

    pub fn is_advisory(&self) -> bool {
        matches!(self, Reply::Advisory(_))
    }
}

struct CachedClient {
    credential: String,
    base_url: String,
    client: Client,
}

impl std::fmt::Debug for CachedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// One conversation session: history, thread cache and the clients they use.
///
/// Construct one per host session; tests construct fresh instances.
#[derive(Debug)]
pub struct Conversation {
    history: HistoryStore,
    threads: ThreadCache,
    client_config: ClientConfig,
    poll_config: PollConfig,
    license: Arc<dyn LicenseValidator>,
    stateless_format: ReplyFormat,
    stateful_format: ReplyFormat,
    client: Mutex<Option<CachedClient>>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            history: HistoryStore::new(0),
            threads: ThreadCache::new(),
            client_config: ClientConfig::default(),
            poll_config: PollConfig::default(),
            license: Arc::new(PendingLicenseValidator),
            stateless_format: ReplyFormat::PassThrough,
            stateful_format: ReplyFormat::Html,
            client: Mutex::new(None),
        }
    }

    /// Transport settings shared by every client; the key and base URL are
    /// taken from each call's configuration.
    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = config;
        self
    }

    pub fn with_poll_config(mut self, config: PollConfig) -> Self {
        self.poll_config = config;
        self
    }

    pub fn with_license_validator(mut self, validator: Arc<dyn LicenseValidator>) -> Self {
        self.license = validator;
        self
    }

    /// Reply formats for the stateless and stateful paths.
    pub fn with_formats(mut self, stateless: ReplyFormat, stateful: ReplyFormat) -> Self {
        self.stateless_format = stateless;
        self.stateful_format = stateful;
        self
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn threads(&self) -> &ThreadCache {
        &self.threads
    }

    /// Answer `question`.
    ///
    /// Cancelling `cancel` drops the in-flight work, which stops retries and
    /// polling, and returns [`ConversationError::Cancelled`]. History is only
    /// written after a reply arrives, so a cancelled or failed call leaves no
    /// trace in it.
    pub async fn respond(
        &self,
        question: &str,
        config: &RequestConfig,
        cancel: &CancellationToken,
    ) -> Result<Reply> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("conversation call cancelled");
                Err(ConversationError::Cancelled)
            }
            result = self.respond_inner(question, config, cancel) => result,
        }
    }

    async fn respond_inner(
        &self,
        question: &str,
        config: &RequestConfig,
        cancel: &CancellationToken,
    ) -> Result<Reply> {
        let route = self.select_route(config).await?;
        debug!(?route, model = %config.model, "route selected");

        match route {
            Route::Advisory(advisory) => Ok(Reply::Advisory(advisory)),
            Route::Stateless { credential } => self
                .respond_stateless(question, config, &credential)
                .await
                .map(Reply::Message),
            Route::Stateful {
                credential,
                assistant_id,
            } => self
                .respond_stateful(question, config, &credential, &assistant_id, cancel)
                .await
                .map(Reply::Message),
        }
    }

    /// Decide which path a call takes. Makes no model requests; managed mode
    /// consults the license validator.
    pub async fn select_route(&self, config: &RequestConfig) -> Result<Route> {
        match config.mode {
            ConfigMode::Personal => {
                let credential = config.credential.trim();
                if credential.is_empty() {
                    return Err(ConversationError::Configuration(MISSING_API_KEY.to_string()));
                }
                let assistant_id = config.assistant_id.trim();
                if assistant_id.is_empty() {
                    Ok(Route::Stateless {
                        credential: credential.to_string(),
                    })
                } else {
                    Ok(Route::Stateful {
                        credential: credential.to_string(),
                        assistant_id: assistant_id.to_string(),
                    })
                }
            }
            ConfigMode::Managed => {
                let license_code = config.license_code.trim();
                if license_code.is_empty() {
                    return Ok(Route::Advisory(MISSING_LICENSE.to_string()));
                }
                match self.license.validate(license_code).await? {
                    LicenseStatus::Invalid { advisory } => Ok(Route::Advisory(advisory)),
                    LicenseStatus::Valid {
                        credential,
                        assistant_id,
                    } => {
                        if assistant_id.trim().is_empty() {
                            Ok(Route::Advisory(MANAGED_REQUIRES_ASSISTANT.to_string()))
                        } else {
                            Ok(Route::Stateful {
                                credential,
                                assistant_id,
                            })
                        }
                    }
                }
            }
        }
    }

    async fn respond_stateless(
        &self,
        question: &str,
        config: &RequestConfig,
        credential: &str,
    ) -> Result<String> {
        let client = self.client(credential, &config.base_url)?;

        let history = self.history.snapshot(config.context_length);
        debug!(turns = history.len(), "sending chat completion");

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(&config.system_prompt));
        messages.extend(history);
        messages.push(ChatMessage::user(question));

        let params =
            ChatCompletionParams::new(&config.model, messages).temperature(config.temperature);
        let completion = client.chat().create(params).await?;
        let reply = completion
            .text()
            .ok_or_else(|| {
                ConversationError::Parse("chat completion returned no message content".to_string())
            })?
            .to_string();

        self.history.append_with_capacity(question, &reply, config.context_length);
        Ok(self.stateless_format.format(&reply))
    }

    async fn respond_stateful(
        &self,
        question: &str,
        config: &RequestConfig,
        credential: &str,
        assistant_id: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let client = self.client(credential, &config.base_url)?;
        let thread_id = self.threads.get_or_create(&client, assistant_id).await?;

        let poller = RunPoller::new(self.poll_config.clone(), self.client_config.clock.clone());
        match poller
            .submit_and_await(&client, &thread_id, assistant_id, question, cancel)
            .await
        {
            Ok(text) => Ok(self.stateful_format.format(&text)),
            Err(error) => {
                if error.is_thread_missing() {
                    warn!(
                        assistant = short_id(assistant_id),
                        %thread_id,
                        "thread no longer exists, dropping cached mapping"
                    );
                    self.threads.clear(assistant_id);
                }
                Err(error)
            }
        }
    }

    /// Client for a credential, reused while the credential and base URL stay
    /// the same.
    fn client(&self, credential: &str, base_url: &str) -> Result<Client> {
        let mut cached = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = cached.as_ref()
            && entry.credential == credential
            && entry.base_url == base_url
        {
            return Ok(entry.client.clone());
        }

        let client = Client::new(
            self.client_config
                .clone()
                .api_key(credential)
                .base_url(base_url),
        )?;
        *cached = Some(CachedClient {
            credential: credential.to_string(),
            base_url: base_url.to_string(),
            client: client.clone(),
        });
        Ok(client)
    }

    /// Clear the history and every cached thread.
    pub fn reset(&self) {
        self.history.clear();
        self.threads.clear_all();
        info!("conversation reset");
    }

    /// Forget the cached thread of one assistant.
    pub fn clear_thread(&self, assistant_id: &str) -> bool {
        self.threads.clear(assistant_id)
    }

    pub fn thread_count(&self) -> usize {
        self.threads.count()
    }
}

#[cfg(test)]
#[path = "orchestrator.test.rs"]
mod tests;
