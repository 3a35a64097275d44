use super::*;
use crate::clock::ManualClock;
use crate::error::OpenAIError;
use crate::telemetry::NoopTelemetry;
use pretty_assertions::assert_eq;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;

fn executor(config: RetryConfig) -> (RetryExecutor, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let executor = RetryExecutor::new(config, clock.clone(), Arc::new(NoopTelemetry));
    (executor, clock)
}

fn network_error() -> OpenAIError {
    OpenAIError::Network {
        operation: "test".to_string(),
        message: "connection failed".to_string(),
    }
}

fn api_error(status: u16) -> OpenAIError {
    OpenAIError::Api {
        operation: "test".to_string(),
        status,
        message: "error".to_string(),
        request_id: None,
    }
}

#[test]
fn test_retry_config_defaults() {
    let config = RetryConfig::default();
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.initial_backoff, Duration::from_millis(500));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(config.backoff_multiplier, 2.0);
    assert_eq!(config.jitter_ratio, 0.5);
}

#[test]
fn test_retry_config_builder() {
    let config = RetryConfig::default()
        .with_max_attempts(5)
        .with_initial_backoff(Duration::from_millis(200))
        .with_max_backoff(Duration::from_secs(5))
        .with_backoff_multiplier(3.0)
        .with_jitter_ratio(2.0);

    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(5));
    assert_eq!(config.backoff_multiplier, 3.0);
    // Clamped to 1.0
    assert_eq!(config.jitter_ratio, 1.0);

    assert_eq!(RetryConfig::default().with_max_attempts(0).max_attempts, 1);
}

#[test]
fn test_backoff_doubles_without_jitter() {
    let config = RetryConfig::default().with_jitter_ratio(0.0);

    assert_eq!(config.backoff_for(1), Duration::from_millis(500));
    assert_eq!(config.backoff_for(2), Duration::from_millis(1000));
    assert_eq!(config.backoff_for(3), Duration::from_millis(2000));
}

#[test]
fn test_backoff_capped_by_max() {
    let config = RetryConfig::default()
        .with_jitter_ratio(0.0)
        .with_max_backoff(Duration::from_secs(1));

    assert_eq!(config.backoff_for(10), Duration::from_secs(1));
}

#[test]
fn test_backoff_jitter_stays_in_band() {
    let config = RetryConfig::default();

    for _ in 0..200 {
        let delay = config.backoff_for(2);
        assert!(delay >= Duration::from_millis(500), "{delay:?} below band");
        assert!(delay <= Duration::from_millis(1500), "{delay:?} above band");
    }
}

#[tokio::test]
async fn test_retry_success_first_attempt() {
    let (executor, clock) = executor(RetryConfig::default());
    let attempts = AtomicI32::new(0);

    let result = executor
        .execute("test", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, OpenAIError>(42) }
        })
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_retry_success_after_failures() {
    let (executor, clock) = executor(RetryConfig::default().with_jitter_ratio(0.0));
    let attempts = AtomicI32::new(0);

    let result = executor
        .execute("test", |attempt| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(api_error(500))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_millis(500), Duration::from_millis(1000)]
    );
}

#[tokio::test]
async fn test_retry_exhausted_returns_last_error() {
    let (executor, clock) = executor(RetryConfig::default());
    let attempts = AtomicI32::new(0);

    let result: Result<i32> = executor
        .execute("test", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(network_error()) }
        })
        .await;

    assert!(matches!(result, Err(OpenAIError::Network { .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(clock.sleeps().len(), 2);
}

#[tokio::test]
async fn test_retry_non_retryable_error() {
    let (executor, clock) = executor(RetryConfig::default().with_max_attempts(5));
    let attempts = AtomicI32::new(0);

    let result: Result<i32> = executor
        .execute("test", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(api_error(404)) }
        })
        .await;

    assert_eq!(result.unwrap_err().status(), Some(404));
    // Client errors are not retried
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_retry_rate_limit_is_retried() {
    let (executor, _clock) = executor(RetryConfig::default());
    let attempts = AtomicI32::new(0);

    let result = executor
        .execute("test", |attempt| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 1 {
                    Err(api_error(429))
                } else {
                    Ok(())
                }
            }
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retry_no_retry_config() {
    let (executor, _clock) = executor(RetryConfig::no_retry());
    let attempts = AtomicI32::new(0);

    let result: Result<i32> = executor
        .execute("test", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(network_error()) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
