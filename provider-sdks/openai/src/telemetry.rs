//! Request telemetry hooks.
//!
//! The transport reports every attempt, every scheduled retry and every
//! exhausted request here. Implementations are observational only.

use std::fmt::Debug;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;
use tracing::warn;

use crate::error::OpenAIError;

/// Observer for transport attempts.
pub trait RequestTelemetry: Send + Sync + Debug {
    /// Called after each attempt with either a status or the attempt error.
    fn on_request(
        &self,
        operation: &str,
        attempt: i32,
        status: Option<StatusCode>,
        error: Option<&OpenAIError>,
        duration: Duration,
    );

    /// Called before sleeping ahead of another attempt.
    fn on_retry(&self, operation: &str, attempt: i32, delay: Duration);

    /// Called when a request gives up, either after the last attempt or on a
    /// non-retryable failure.
    fn on_exhausted(&self, operation: &str, attempts: i32, error: &OpenAIError);
}

/// Telemetry that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl RequestTelemetry for NoopTelemetry {
    fn on_request(
        &self,
        _operation: &str,
        _attempt: i32,
        _status: Option<StatusCode>,
        _error: Option<&OpenAIError>,
        _duration: Duration,
    ) {
    }

    fn on_retry(&self, _operation: &str, _attempt: i32, _delay: Duration) {}

    fn on_exhausted(&self, _operation: &str, _attempts: i32, _error: &OpenAIError) {}
}

/// Telemetry that writes each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTelemetry;

impl RequestTelemetry for LoggingTelemetry {
    fn on_request(
        &self,
        operation: &str,
        attempt: i32,
        status: Option<StatusCode>,
        error: Option<&OpenAIError>,
        duration: Duration,
    ) {
        match (status, error) {
            (_, Some(error)) => debug!(
                operation,
                attempt,
                outcome = %error.status_label(),
                duration_ms = duration.as_millis() as u64,
                "request attempt failed: {error}"
            ),
            (Some(status), None) => debug!(
                operation,
                attempt,
                outcome = status.as_u16(),
                duration_ms = duration.as_millis() as u64,
                "request attempt completed"
            ),
            (None, None) => debug!(operation, attempt, "request attempt finished"),
        }
    }

    fn on_retry(&self, operation: &str, attempt: i32, delay: Duration) {
        warn!(
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "retrying request"
        );
    }

    fn on_exhausted(&self, operation: &str, attempts: i32, error: &OpenAIError) {
        warn!(operation, attempts, "request gave up: {error}");
    }
}

#[cfg(test)]
#[path = "telemetry.test.rs"]
mod tests;
