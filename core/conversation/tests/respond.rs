//! End-to-end conversation calls against a mock OpenAI server.

use std::sync::Arc;
use std::time::Duration;

use askgpt_config::ConfigMode;
use askgpt_config::RequestConfig;
use askgpt_conversation::Conversation;
use askgpt_conversation::ConversationError;
use askgpt_conversation::Reply;
use openai_sdk::ClientConfig;
use openai_sdk::ManualClock;
use openai_sdk::NoopTelemetry;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn conversation() -> Conversation {
    Conversation::new().with_client_config(
        ClientConfig::default()
            .clock(Arc::new(ManualClock::new()))
            .telemetry(Arc::new(NoopTelemetry)),
    )
}

fn chat_config(server: &MockServer, context_length: usize) -> RequestConfig {
    RequestConfig {
        credential: "sk-test".to_string(),
        system_prompt: "You are a game master.".to_string(),
        context_length,
        base_url: server.uri(),
        ..Default::default()
    }
}

fn assistant_config(server: &MockServer) -> RequestConfig {
    RequestConfig {
        assistant_id: "asst_1".to_string(),
        ..chat_config(server, 5)
    }
}

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    }))
}

fn run(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "run_1",
        "thread_id": "thread_1",
        "assistant_id": "asst_1",
        "status": status
    }))
}

/// Mounts the full assistant flow with expected call counts.
async fn mount_assistant_flow(server: &MockServer, threads_created: u64, exchanges: u64) {
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "thread_1"})))
        .expect(threads_created)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_q",
            "role": "user",
            "content": [{"type": "text", "text": {"value": "hello"}}]
        })))
        .expect(exchanges)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .respond_with(run("queued"))
        .expect(exchanges)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(run("completed"))
        .expect(exchanges..)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "msg_a",
                "role": "assistant",
                "run_id": "run_1",
                "content": [{"type": "text", "text": {"value": "Hello, traveller.\n\nWhat brings you here?"}}]
            }]
        })))
        .expect(exchanges)
        .mount(server)
        .await;
}

async fn last_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    let request = requests.last().unwrap();
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn test_stateless_payload_has_system_history_and_question() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("<p>Roll a d20.</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let conversation = conversation();
    conversation.history().set_capacity(5);
    conversation.history().append("q1", "a1");
    conversation.history().append("q2", "a2");
    conversation.history().append("q3", "a3");
    assert_eq!(conversation.history().len(), 5);

    let reply = conversation
        .respond("Who goes first?", &chat_config(&server, 5), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(reply, Reply::Message("<p>Roll a d20.</p>".to_string()));

    let body = last_request_body(&server).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 7);
    assert_eq!(messages[0], json!({"role": "system", "content": "You are a game master."}));
    assert_eq!(messages[1], json!({"role": "assistant", "content": "a1"}));
    assert_eq!(messages[6], json!({"role": "user", "content": "Who goes first?"}));
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["temperature"], 1.0);

    let history = conversation.history().snapshot(10);
    assert_eq!(history.len(), 5);
    assert_eq!(history[3].content, "Who goes first?");
    assert_eq!(history[4].content, "<p>Roll a d20.</p>");
}

#[tokio::test]
async fn test_stateless_zero_context_sends_only_system_and_question() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("Yes."))
        .expect(2)
        .mount(&server)
        .await;

    let conversation = conversation();
    let config = chat_config(&server, 0);
    let cancel = CancellationToken::new();

    conversation.respond("First?", &config, &cancel).await.unwrap();
    conversation.respond("Second?", &config, &cancel).await.unwrap();

    let body = last_request_body(&server).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1]["content"], "Second?");
    assert!(conversation.history().is_empty());
}

#[tokio::test]
async fn test_stateful_flow_call_counts() {
    let server = MockServer::start().await;
    mount_assistant_flow(&server, 1, 1).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let conversation = conversation();
    let reply = conversation
        .respond("hello", &assistant_config(&server), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        reply,
        Reply::Message("<p>Hello, traveller.</p><p>What brings you here?</p>".to_string())
    );
    assert_eq!(conversation.thread_count(), 1);
    assert!(conversation.history().is_empty());
}

#[tokio::test]
async fn test_stateful_reuses_cached_thread() {
    let server = MockServer::start().await;
    mount_assistant_flow(&server, 1, 2).await;

    let conversation = conversation();
    let config = assistant_config(&server);
    let cancel = CancellationToken::new();

    conversation.respond("hello", &config, &cancel).await.unwrap();
    conversation.respond("hello again", &config, &cancel).await.unwrap();

    assert_eq!(conversation.thread_count(), 1);
}

#[tokio::test]
async fn test_reset_forces_new_thread() {
    let server = MockServer::start().await;
    mount_assistant_flow(&server, 2, 2).await;

    let conversation = conversation();
    let config = assistant_config(&server);
    let cancel = CancellationToken::new();

    conversation.respond("hello", &config, &cancel).await.unwrap();
    conversation.reset();
    assert_eq!(conversation.thread_count(), 0);
    conversation.respond("hello", &config, &cancel).await.unwrap();
}

#[tokio::test]
async fn test_missing_thread_evicts_cache_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "thread_1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "No thread found with id 'thread_1'."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let conversation = conversation();
    let error = conversation
        .respond("hello", &assistant_config(&server), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(error.is_thread_missing());
    assert_eq!(conversation.thread_count(), 0);
}

#[tokio::test]
async fn test_unknown_assistant_keeps_cached_thread() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "thread_1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_q",
            "role": "user",
            "content": [{"type": "text", "text": {"value": "hello"}}]
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "No assistant found with id 'asst_1'."}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let conversation = conversation();
    let config = assistant_config(&server);
    let cancel = CancellationToken::new();

    for _ in 0..2 {
        let error = conversation.respond("hello", &config, &cancel).await.unwrap_err();
        assert!(!error.is_thread_missing());
        match &error {
            ConversationError::Transport(inner) => assert_eq!(inner.status(), Some(404)),
            other => panic!("expected Transport, got {other:?}"),
        }
    }
    assert_eq!(conversation.thread_count(), 1);
}

#[tokio::test]
async fn test_missing_api_key_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let conversation = conversation();
    let config = RequestConfig {
        credential: String::new(),
        ..assistant_config(&server)
    };
    let error = conversation
        .respond("hello", &config, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(error, ConversationError::Configuration(_)));
    assert_eq!(conversation.thread_count(), 0);
}

#[tokio::test]
async fn test_managed_mode_returns_advisory_without_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let conversation = conversation();
    let config = RequestConfig {
        mode: ConfigMode::Managed,
        license_code: "LIC-1".to_string(),
        ..chat_config(&server, 5)
    };
    let reply = conversation
        .respond("hello", &config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        reply,
        Reply::Advisory(
            "Premium features are coming soon! Please use Personal mode for now.".to_string()
        )
    );
}

#[tokio::test]
async fn test_failed_call_leaves_history_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "Invalid model", "code": "model_not_found"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let conversation = conversation();
    let error = conversation
        .respond("hello", &chat_config(&server, 5), &CancellationToken::new())
        .await
        .unwrap_err();

    match &error {
        ConversationError::Transport(inner) => assert_eq!(inner.status(), Some(400)),
        other => panic!("expected Transport, got {other:?}"),
    }
    assert!(conversation.history().is_empty());
}

#[tokio::test]
async fn test_failed_call_with_shorter_context_keeps_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let conversation = conversation();
    conversation.history().set_capacity(5);
    conversation.history().append("q1", "a1");
    conversation.history().append("q2", "a2");

    let error = conversation
        .respond("hello", &chat_config(&server, 1), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(error, ConversationError::Transport(_)));
    assert_eq!(conversation.history().capacity(), 5);
    assert_eq!(conversation.history().len(), 4);

    let body = last_request_body(&server).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], json!({"role": "assistant", "content": "a2"}));
}

#[tokio::test]
async fn test_empty_completion_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .expect(1)
        .mount(&server)
        .await;

    let conversation = conversation();
    let error = conversation
        .respond("hello", &chat_config(&server, 5), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(error, ConversationError::Parse(_)));
    assert!(conversation.history().is_empty());
}

#[tokio::test]
async fn test_cancel_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("too late").set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let conversation = conversation();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let error = conversation
        .respond("hello", &chat_config(&server, 5), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(error, ConversationError::Cancelled));
    assert!(conversation.history().is_empty());
}
