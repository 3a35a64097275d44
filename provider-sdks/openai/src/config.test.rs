use super::*;
use crate::clock::ManualClock;
use crate::telemetry::NoopTelemetry;

#[test]
fn test_config_new() {
    let config = ClientConfig::new("test-key");
    assert_eq!(config.api_key, "test-key");
    assert_eq!(config.base_url, ClientConfig::DEFAULT_BASE_URL);
    assert_eq!(config.timeout, ClientConfig::DEFAULT_TIMEOUT);
    assert_eq!(config.retry, RetryConfig::default());
    assert_eq!(config.assistants_beta, "assistants=v2");
}

#[test]
fn test_config_builder() {
    let config = ClientConfig::new("test-key")
        .base_url("https://custom.api.com/v1/")
        .timeout(Duration::from_secs(30))
        .retry(RetryConfig::no_retry())
        .assistants_beta("assistants=v1")
        .clock(Arc::new(ManualClock::new()))
        .telemetry(Arc::new(NoopTelemetry));

    assert_eq!(config.api_key, "test-key");
    // Trailing slash is dropped so paths join cleanly
    assert_eq!(config.base_url, "https://custom.api.com/v1");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.retry.max_attempts, 1);
    assert_eq!(config.assistants_beta, "assistants=v1");
}

#[test]
fn test_config_replaces_api_key() {
    let template = ClientConfig::default().base_url("http://localhost:9999");
    let config = template.clone().api_key("sk-other");

    assert_eq!(config.api_key, "sk-other");
    assert_eq!(config.base_url, "http://localhost:9999");
    assert!(template.api_key.is_empty());
}

#[test]
fn test_config_debug_redacts_key() {
    let config = ClientConfig::new("sk-secret-value");
    let debug = format!("{config:?}");
    assert!(debug.contains("[REDACTED]"));
    assert!(!debug.contains("sk-secret-value"));
}
