use super::*;

#[test]
fn test_noop_telemetry() {
    let telemetry = NoopTelemetry;
    telemetry.on_request(
        "chatCompletion",
        1,
        Some(StatusCode::OK),
        None,
        Duration::from_millis(100),
    );
    telemetry.on_retry("chatCompletion", 1, Duration::from_millis(500));
}

#[test]
fn test_logging_telemetry() {
    let telemetry = LoggingTelemetry;

    // Successful attempt
    telemetry.on_request(
        "createThread",
        1,
        Some(StatusCode::OK),
        None,
        Duration::from_millis(100),
    );

    // Failed attempt
    let error = OpenAIError::Network {
        operation: "createThread".to_string(),
        message: "connection refused".to_string(),
    };
    telemetry.on_request("createThread", 2, None, Some(&error), Duration::from_millis(50));

    // Retry and exhaustion
    telemetry.on_retry("createThread", 2, Duration::from_secs(1));
    telemetry.on_exhausted("createThread", 3, &error);
}

#[test]
fn test_telemetry_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NoopTelemetry>();
    assert_send_sync::<LoggingTelemetry>();
}
