//! Client configuration for the OpenAI SDK.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::clock::TokioClock;
use crate::retry::RetryConfig;
use crate::telemetry::LoggingTelemetry;
use crate::telemetry::RequestTelemetry;

/// Configuration for the OpenAI API client.
pub struct ClientConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API.
    pub base_url: String,

    /// Per-attempt request timeout.
    pub timeout: Duration,

    /// Retry policy for transient failures.
    pub retry: RetryConfig,

    /// Value of the `OpenAI-Beta` header sent on assistants endpoints.
    pub assistants_beta: String,

    /// Clock used for backoff sleeps.
    pub clock: Arc<dyn Clock>,

    /// Observer for request attempts.
    pub telemetry: Arc<dyn RequestTelemetry>,
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("assistants_beta", &self.assistants_beta)
            .field("clock", &self.clock)
            .field("telemetry", &self.telemetry)
            .finish()
    }
}

impl Clone for ClientConfig {
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            retry: self.retry.clone(),
            assistants_beta: self.assistants_beta.clone(),
            clock: self.clock.clone(),
            telemetry: self.telemetry.clone(),
        }
    }
}

impl ClientConfig {
    /// Default base URL for OpenAI API.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Default per-attempt timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Default assistants API version marker.
    pub const DEFAULT_ASSISTANTS_BETA: &'static str = "assistants=v2";

    /// Create a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Replace the API key, keeping every other setting.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the assistants API version marker.
    pub fn assistants_beta(mut self, value: impl Into<String>) -> Self {
        self.assistants_beta = value.into();
        self
    }

    /// Set the clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the telemetry observer.
    pub fn telemetry(mut self, telemetry: Arc<dyn RequestTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            assistants_beta: Self::DEFAULT_ASSISTANTS_BETA.to_string(),
            clock: Arc::new(TokioClock),
            telemetry: Arc::new(LoggingTelemetry),
        }
    }
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
