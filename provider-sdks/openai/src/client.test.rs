use super::*;
use crate::clock::ManualClock;
use crate::retry::RetryConfig;
use crate::telemetry::NoopTelemetry;
use crate::telemetry::RequestTelemetry;
use crate::types::ChatCompletionParams;
use crate::types::ChatMessage;
use crate::types::RunStatus;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

/// Records `(attempt, status)` per request attempt.
#[derive(Debug, Default)]
struct RecordingTelemetry {
    attempts: Mutex<Vec<(i32, Option<u16>)>>,
    exhausted: Mutex<Vec<i32>>,
}

impl RequestTelemetry for RecordingTelemetry {
    fn on_request(
        &self,
        _operation: &str,
        attempt: i32,
        status: Option<StatusCode>,
        _error: Option<&OpenAIError>,
        _duration: Duration,
    ) {
        self.attempts
            .lock()
            .unwrap()
            .push((attempt, status.map(|s| s.as_u16())));
    }

    fn on_retry(&self, _operation: &str, _attempt: i32, _delay: Duration) {}

    fn on_exhausted(&self, _operation: &str, attempts: i32, _error: &OpenAIError) {
        self.exhausted.lock().unwrap().push(attempts);
    }
}

fn test_config(base_url: &str, clock: Arc<ManualClock>) -> ClientConfig {
    ClientConfig::new("test-api-key")
        .base_url(base_url)
        .clock(clock)
        .telemetry(Arc::new(NoopTelemetry))
}

fn make_client(base_url: &str) -> (Client, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let client = Client::new(test_config(base_url, clock.clone())).expect("client");
    (client, clock)
}

fn completion_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    })
}

#[test]
fn test_client_requires_api_key() {
    let result = Client::new(ClientConfig::default());
    assert!(matches!(result, Err(OpenAIError::Configuration(_))));

    let result = Client::with_api_key("   ");
    assert!(matches!(result, Err(OpenAIError::Configuration(_))));
}

#[test]
fn test_client_rejects_invalid_header_key() {
    let result = Client::with_api_key("bad\nkey");
    assert!(matches!(result, Err(OpenAIError::Configuration(_))));
}

#[test]
fn test_client_with_api_key() {
    let client = Client::with_api_key("test-key").expect("client");
    assert_eq!(client.config().base_url, ClientConfig::DEFAULT_BASE_URL);
}

#[test]
fn test_parse_api_error_structured() {
    let body = r#"{"error":{"code":"model_not_found","message":"The model does not exist"}}"#;
    let error = parse_api_error("chatCompletion", 404, body, Some("req-1".to_string()));
    match error {
        OpenAIError::Api {
            operation,
            status,
            message,
            request_id,
        } => {
            assert_eq!(operation, "chatCompletion");
            assert_eq!(status, 404);
            assert_eq!(message, "The model does not exist (model_not_found)");
            assert_eq!(request_id.as_deref(), Some("req-1"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn test_parse_api_error_raw_body() {
    let error = parse_api_error("getRun", 502, "Bad Gateway", None);
    assert_eq!(error.to_string(), "getRun failed with HTTP 502: Bad Gateway");
}

#[tokio::test]
async fn test_chat_create_sends_headers_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "Hi"}],
            "temperature": 1.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = make_client(&server.uri());
    let params =
        ChatCompletionParams::new("gpt-4o-mini", vec![ChatMessage::user("Hi")]).temperature(1.0);
    let completion = client.chat().create(params).await.expect("completion");

    assert_eq!(completion.text(), Some("Hello"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("OpenAI-Beta").is_none());
}

#[tokio::test]
async fn test_assistants_requests_carry_beta_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads"))
        .and(header("OpenAI-Beta", "assistants=v2"))
        .and(body_json(serde_json::json!({})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": "thread_1", "object": "thread"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .and(header("OpenAI-Beta", "assistants=v2"))
        .and(body_json(serde_json::json!({"role": "user", "content": "Hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "msg_1",
            "thread_id": "thread_1",
            "role": "user",
            "content": [{"type": "text", "text": {"value": "Hello", "annotations": []}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .and(body_json(serde_json::json!({"assistant_id": "asst_1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "run_1",
            "thread_id": "thread_1",
            "assistant_id": "asst_1",
            "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .and(header("OpenAI-Beta", "assistants=v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "run_1",
            "thread_id": "thread_1",
            "status": "completed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .and(query_param("order", "desc"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [{
                "id": "msg_2",
                "role": "assistant",
                "run_id": "run_1",
                "content": [{"type": "text", "text": {"value": "Hi there"}}]
            }],
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = make_client(&server.uri());
    let thread = client.threads().create().await.expect("thread");
    assert_eq!(thread.id, "thread_1");

    let message = client
        .messages()
        .create(&thread.id, "Hello")
        .await
        .expect("message");
    assert_eq!(message.text(), "Hello");

    let run = client.runs().create(&thread.id, "asst_1").await.expect("run");
    assert_eq!(run.status, RunStatus::Queued);

    let run = client
        .runs()
        .retrieve(&thread.id, &run.id)
        .await
        .expect("run");
    assert_eq!(run.status, RunStatus::Completed);

    let list = client.messages().list(&thread.id, 20).await.expect("list");
    let reply = list.latest_assistant_message(Some("run_1")).expect("reply");
    assert_eq!(reply.text(), "Hi there");
}

#[tokio::test]
async fn test_retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Recovered")))
        .expect(1)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new());
    let telemetry = Arc::new(RecordingTelemetry::default());
    let config = test_config(&server.uri(), clock.clone())
        .retry(RetryConfig::default().with_jitter_ratio(0.0))
        .telemetry(telemetry.clone());
    let client = Client::new(config).expect("client");

    let completion = client
        .chat()
        .create(ChatCompletionParams::new("gpt-4o-mini", vec![ChatMessage::user("Hi")]))
        .await
        .expect("completion after retries");

    assert_eq!(completion.text(), Some("Recovered"));
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_millis(500), Duration::from_millis(1000)]
    );
    assert_eq!(
        *telemetry.attempts.lock().unwrap(),
        vec![(1, Some(500)), (2, Some(500)), (3, Some(200))]
    );
    assert!(telemetry.exhausted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/thread_gone/runs/run_1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"message": "No thread found with id 'thread_gone'."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, clock) = make_client(&server.uri());
    let error = client
        .runs()
        .retrieve("thread_gone", "run_1")
        .await
        .expect_err("404 should fail");

    assert_eq!(error.status(), Some(404));
    assert_eq!(error.operation(), Some("getRun"));
    assert!(!error.is_retryable());
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_exhausted_retries_return_last_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("x-request-id", "req-503")
                .set_body_string("unavailable"),
        )
        .expect(3)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new());
    let telemetry = Arc::new(RecordingTelemetry::default());
    let config = test_config(&server.uri(), clock.clone()).telemetry(telemetry.clone());
    let client = Client::new(config).expect("client");

    let error = client.threads().create().await.expect_err("should give up");

    match &error {
        OpenAIError::Api {
            operation,
            status,
            request_id,
            ..
        } => {
            assert_eq!(operation, "createThread");
            assert_eq!(*status, 503);
            assert_eq!(request_id.as_deref(), Some("req-503"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(clock.sleeps().len(), 2);
    assert_eq!(*telemetry.exhausted.lock().unwrap(), vec![3]);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_2"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, clock) = make_client(&server.uri());
    let thread = client.threads().create().await.expect("thread");

    assert_eq!(thread.id, "thread_2");
    assert_eq!(clock.sleeps().len(), 1);
}

#[tokio::test]
async fn test_malformed_success_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let (client, clock) = make_client(&server.uri());
    let error = client
        .chat()
        .create(ChatCompletionParams::new("gpt-4o-mini", vec![ChatMessage::user("Hi")]))
        .await
        .expect_err("malformed body");

    assert!(matches!(error, OpenAIError::Parse { .. }));
    assert_eq!(error.operation(), Some("chatCompletion"));
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_network_error_is_retried_until_exhausted() {
    // Nothing listens on the discard port.
    let (client, clock) = make_client("http://127.0.0.1:9");

    let error = client.threads().create().await.expect_err("unreachable");

    assert!(matches!(error, OpenAIError::Network { .. }));
    assert_eq!(error.operation(), Some("createThread"));
    assert_eq!(clock.sleeps().len(), 2);
}

#[tokio::test]
async fn test_send_accepts_custom_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models/gpt-4o-mini"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "gpt-4o-mini"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = make_client(&server.uri());
    let model: serde_json::Value = client
        .send(
            Method::GET,
            "/models/gpt-4o-mini",
            None,
            ApiFamily::Chat,
            "getModel",
        )
        .await
        .expect("model");

    assert_eq!(model["id"], "gpt-4o-mini");
}
