//! Retry configuration and execution.
//!
//! This module provides exponential backoff with jitter. Attempts are
//! counted in total, so `max_attempts = 3` means one request plus at most
//! two retries.
//!
//! # Example
//!
//! ```ignore
//! use openai_sdk::retry::{RetryConfig, RetryExecutor};
//!
//! let config = RetryConfig::default()
//!     .with_max_attempts(5)
//!     .with_initial_backoff(Duration::from_millis(200));
//!
//! let executor = RetryExecutor::new(config, clock, telemetry);
//! let result = executor.execute("createThread", |_attempt| async {
//!     make_api_call().await
//! }).await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::clock::Clock;
use crate::error::Result;
use crate::telemetry::RequestTelemetry;

/// Retry configuration with exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts (1 = no retry).
    pub max_attempts: i32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
    /// Jitter ratio (0.0-1.0); 0.5 spreads each delay over ±50%.
    pub jitter_ratio: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter_ratio: 0.5,
        }
    }
}

impl RetryConfig {
    /// Create a config that disables retries (single attempt).
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Set the maximum number of attempts.
    pub fn with_max_attempts(mut self, attempts: i32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the initial backoff delay.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Set the maximum backoff delay.
    pub fn with_max_backoff(mut self, max: Duration) -> Self {
        self.max_backoff = max;
        self
    }

    /// Set the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the jitter ratio (0.0 to 1.0).
    pub fn with_jitter_ratio(mut self, ratio: f64) -> Self {
        self.jitter_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn backoff_for(&self, attempt: i32) -> Duration {
        let max = self.max_backoff.as_secs_f64();
        let base = self.initial_backoff.as_secs_f64()
            * self.backoff_multiplier.powi((attempt - 1).max(0));
        let base = base.min(max);

        let spread = if self.jitter_ratio > 0.0 {
            rand::rng().random_range(-1.0..=1.0) * self.jitter_ratio
        } else {
            0.0
        };

        Duration::from_secs_f64((base * (1.0 + spread)).clamp(0.0, max))
    }
}

/// Runs an operation under a [`RetryConfig`], sleeping on the injected clock.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    clock: Arc<dyn Clock>,
    telemetry: Arc<dyn RequestTelemetry>,
}

impl RetryExecutor {
    /// Create a new retry executor.
    pub fn new(
        config: RetryConfig,
        clock: Arc<dyn Clock>,
        telemetry: Arc<dyn RequestTelemetry>,
    ) -> Self {
        Self {
            config,
            clock,
            telemetry,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retries.
    ///
    /// The operation is retried while it returns a retryable error (see
    /// [`crate::OpenAIError::is_retryable`]) and attempts remain. The last
    /// error is returned unchanged once the budget is spent. The closure
    /// receives the 1-based attempt number.
    pub async fn execute<F, Fut, T>(&self, operation: &str, mut attempt_fn: F) -> Result<T>
    where
        F: FnMut(i32) -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 1;

        loop {
            match attempt_fn(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !error.is_retryable() || attempt >= self.config.max_attempts {
                        self.telemetry.on_exhausted(operation, attempt, &error);
                        return Err(error);
                    }

                    let delay = self.config.backoff_for(attempt);
                    self.telemetry.on_retry(operation, attempt, delay);
                    self.clock.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "retry.test.rs"]
mod tests;
