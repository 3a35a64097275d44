use super::*;
use pretty_assertions::assert_eq;

fn api(operation: &str, status: u16) -> OpenAIError {
    OpenAIError::Api {
        operation: operation.to_string(),
        status,
        message: "error".to_string(),
        request_id: None,
    }
}

#[test]
fn test_from_openai_error_routes_variants() {
    let error: ConversationError = OpenAIError::Configuration("API key is required".into()).into();
    assert!(matches!(error, ConversationError::Configuration(_)));

    let error: ConversationError = OpenAIError::Parse {
        operation: "chatCompletion".into(),
        message: "expected value".into(),
    }
    .into();
    assert!(matches!(error, ConversationError::Parse(_)));

    let error: ConversationError = api("createThread", 503).into();
    assert!(matches!(error, ConversationError::Transport(_)));
}

#[test]
fn test_thread_missing_detection() {
    assert!(ConversationError::from(api("postMessage", 404)).is_thread_missing());
    assert!(ConversationError::from(api("getRun", 404)).is_thread_missing());
    assert!(ConversationError::from(api("listMessages", 404)).is_thread_missing());
    assert!(!ConversationError::from(api("createRun", 404)).is_thread_missing());
    assert!(!ConversationError::from(api("chatCompletion", 404)).is_thread_missing());
    assert!(!ConversationError::from(api("postMessage", 500)).is_thread_missing());
    assert!(!ConversationError::Cancelled.is_thread_missing());
}

#[test]
fn test_user_messages() {
    assert_eq!(
        ConversationError::from(api("chatCompletion", 401)).user_message(),
        "The OpenAI API key was rejected. Please check it in the settings."
    );
    assert_eq!(
        ConversationError::from(OpenAIError::Network {
            operation: "createThread".into(),
            message: "connection refused".into(),
        })
        .user_message(),
        "Could not reach the AI service. Please check your connection."
    );
    assert_eq!(
        ConversationError::RunFailed {
            status: RunStatus::Expired,
            message: String::new(),
        }
        .user_message(),
        "The assistant could not finish this request (run expired)."
    );
    assert_eq!(
        ConversationError::Configuration("Please set an API key.".into()).user_message(),
        "Please set an API key."
    );
}

#[test]
fn test_display_keeps_diagnostics() {
    let error = ConversationError::from(api("getRun", 502));
    assert_eq!(error.to_string(), "getRun failed with HTTP 502: error");

    let error = ConversationError::RunTimeout {
        run_id: "run_1".into(),
        waited: Duration::from_secs(60),
        last_status: RunStatus::InProgress,
    };
    assert_eq!(error.to_string(), "run run_1 still in_progress after 60s");
}
