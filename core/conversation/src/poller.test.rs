use super::*;
use async_trait::async_trait;
use openai_sdk::ClientConfig;
use openai_sdk::ManualClock;
use openai_sdk::NoopTelemetry;
use pretty_assertions::assert_eq;
use std::time::Instant;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn client(server: &MockServer, clock: Arc<dyn Clock>) -> Client {
    Client::new(
        ClientConfig::new("test-key")
            .base_url(server.uri())
            .clock(clock)
            .telemetry(Arc::new(NoopTelemetry)),
    )
    .unwrap()
}

fn run(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "run_1",
        "thread_id": "thread_1",
        "assistant_id": "asst_1",
        "status": status
    }))
}

async fn mount_submit(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "msg_q",
            "role": "user",
            "content": [{"type": "text", "text": {"value": "hello"}}]
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .respond_with(run("queued"))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_reply(server: &MockServer, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {
                    "id": "msg_a",
                    "role": "assistant",
                    "run_id": "run_1",
                    "content": [{"type": "text", "text": {"value": "Roll a d20."}}]
                },
                {
                    "id": "msg_q",
                    "role": "user",
                    "content": [{"type": "text", "text": {"value": "hello"}}]
                }
            ]
        })))
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_queued_in_progress_completed_returns_reply() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(run("in_progress"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(run("completed"))
        .expect(1)
        .mount(&server)
        .await;
    mount_reply(&server, 1).await;

    let clock = Arc::new(ManualClock::new());
    let poller = RunPoller::new(PollConfig::default(), clock.clone());
    let reply = poller
        .submit_and_await(
            &client(&server, clock.clone()),
            "thread_1",
            "asst_1",
            "hello",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(reply, "Roll a d20.");
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 2]);
}

#[tokio::test]
async fn test_failed_run_raises_run_failed() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "run_1",
            "status": "failed",
            "last_error": {"code": "server_error", "message": "Something went wrong."}
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_reply(&server, 0).await;

    let clock = Arc::new(ManualClock::new());
    let poller = RunPoller::new(PollConfig::default(), clock.clone());
    let error = poller
        .submit_and_await(
            &client(&server, clock),
            "thread_1",
            "asst_1",
            "hello",
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match error {
        ConversationError::RunFailed { status, message } => {
            assert_eq!(status, RunStatus::Failed);
            assert_eq!(message, "Something went wrong.");
        }
        other => panic!("expected RunFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_every_terminal_failure_status_stops_polling() {
    for status in ["cancelled", "expired", "incomplete"] {
        let server = MockServer::start().await;
        mount_submit(&server).await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(run(status))
            .expect(1)
            .mount(&server)
            .await;
        mount_reply(&server, 0).await;

        let clock = Arc::new(ManualClock::new());
        let poller = RunPoller::new(PollConfig::default(), clock.clone());
        let error = poller
            .submit_and_await(
                &client(&server, clock.clone()),
                "thread_1",
                "asst_1",
                "hello",
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match error {
            ConversationError::RunFailed { status: got, message } => {
                assert_eq!(got.as_str(), status);
                assert_eq!(message, "");
            }
            other => panic!("expected RunFailed for {status}, got {other:?}"),
        }
        assert_eq!(clock.sleeps().len(), 1, "{status} should stop after one poll");
    }
}

#[tokio::test]
async fn test_stuck_run_times_out() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(run("in_progress"))
        .expect(3)
        .mount(&server)
        .await;
    mount_reply(&server, 0).await;

    let clock = Arc::new(ManualClock::new());
    let config = PollConfig::default().with_max_wait(Duration::from_secs(3));
    let poller = RunPoller::new(config, clock.clone());
    let error = poller
        .submit_and_await(
            &client(&server, clock.clone()),
            "thread_1",
            "asst_1",
            "hello",
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match error {
        ConversationError::RunTimeout {
            run_id,
            waited,
            last_status,
        } => {
            assert_eq!(run_id, "run_1");
            assert_eq!(waited, Duration::from_secs(3));
            assert_eq!(last_status, RunStatus::InProgress);
        }
        other => panic!("expected RunTimeout, got {other:?}"),
    }
    assert_eq!(clock.elapsed(), Duration::from_secs(3));
}

#[tokio::test]
async fn test_requires_action_keeps_polling_until_budget() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(run("requires_action"))
        .expect(2)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new());
    let config = PollConfig::default()
        .with_interval(Duration::from_millis(500))
        .with_max_wait(Duration::from_secs(1));
    let poller = RunPoller::new(config, clock.clone());
    let error = poller
        .submit_and_await(
            &client(&server, clock),
            "thread_1",
            "asst_1",
            "hello",
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ConversationError::RunTimeout {
            last_status: RunStatus::RequiresAction,
            ..
        }
    ));
}

#[tokio::test]
async fn test_completed_without_assistant_text_is_parse_error() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(run("completed"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new());
    let poller = RunPoller::new(PollConfig::default(), clock.clone());
    let error = poller
        .submit_and_await(
            &client(&server, clock),
            "thread_1",
            "asst_1",
            "hello",
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, ConversationError::Parse(_)));
}

#[tokio::test]
async fn test_pre_cancelled_token_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new());
    let poller = RunPoller::new(PollConfig::default(), clock.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let error = poller
        .submit_and_await(&client(&server, clock), "thread_1", "asst_1", "hello", &cancel)
        .await
        .unwrap_err();
    assert!(matches!(error, ConversationError::Cancelled));
}

/// Clock whose first sleep cancels the token and never wakes.
#[derive(Debug)]
struct CancelOnSleep {
    token: CancellationToken,
}

#[async_trait]
impl Clock for CancelOnSleep {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, _duration: Duration) {
        self.token.cancel();
        std::future::pending::<()>().await;
    }
}

#[tokio::test]
async fn test_cancel_during_poll_stops_requests() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(run("in_progress"))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let clock: Arc<dyn Clock> = Arc::new(CancelOnSleep {
        token: cancel.clone(),
    });
    let poller = RunPoller::new(PollConfig::default(), clock.clone());

    let error = poller
        .submit_and_await(&client(&server, clock), "thread_1", "asst_1", "hello", &cancel)
        .await
        .unwrap_err();
    assert!(matches!(error, ConversationError::Cancelled));
}
