use super::*;

fn api(status: u16) -> OpenAIError {
    OpenAIError::Api {
        operation: "chatCompletion".to_string(),
        status,
        message: "error".to_string(),
        request_id: None,
    }
}

#[test]
fn test_retryable_errors() {
    assert!(
        OpenAIError::Network {
            operation: "createThread".to_string(),
            message: "connection refused".to_string(),
        }
        .is_retryable()
    );
    assert!(api(429).is_retryable());
    assert!(api(500).is_retryable());
    assert!(api(503).is_retryable());
    assert!(api(599).is_retryable());
}

#[test]
fn test_non_retryable_errors() {
    assert!(!OpenAIError::Configuration("test".to_string()).is_retryable());
    assert!(!api(400).is_retryable());
    assert!(!api(401).is_retryable());
    assert!(!api(404).is_retryable());
    assert!(
        !OpenAIError::Parse {
            operation: "getRun".to_string(),
            message: "expected value".to_string(),
        }
        .is_retryable()
    );
}

#[test]
fn test_diagnostics() {
    let error = api(502);
    assert_eq!(error.status(), Some(502));
    assert_eq!(error.operation(), Some("chatCompletion"));
    assert_eq!(error.status_label(), "502");
    assert_eq!(
        error.to_string(),
        "chatCompletion failed with HTTP 502: error"
    );

    let error = OpenAIError::Network {
        operation: "createRun".to_string(),
        message: "reset".to_string(),
    };
    assert_eq!(error.status(), None);
    assert_eq!(error.status_label(), "network");
    assert_eq!(error.operation(), Some("createRun"));

    assert_eq!(OpenAIError::Configuration("x".to_string()).operation(), None);
}
