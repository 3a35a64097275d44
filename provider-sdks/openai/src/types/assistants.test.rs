use super::*;
use pretty_assertions::assert_eq;

fn message(id: &str, role: &str, run_id: Option<&str>, text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "object": "thread.message",
        "thread_id": "thread_1",
        "role": role,
        "run_id": run_id,
        "content": [{"type": "text", "text": {"value": text, "annotations": []}}],
        "created_at": 1700000000
    })
}

#[test]
fn test_run_status_deserialize() {
    let run: Run = serde_json::from_value(serde_json::json!({
        "id": "run_1",
        "object": "thread.run",
        "thread_id": "thread_1",
        "assistant_id": "asst_1",
        "status": "in_progress"
    }))
    .unwrap();

    assert_eq!(run.status, RunStatus::InProgress);
    assert!(!run.status.is_terminal());
    assert!(run.last_error.is_none());
}

#[test]
fn test_run_status_unknown_value() {
    let status: RunStatus = serde_json::from_str("\"paused_for_review\"").unwrap();
    assert_eq!(status, RunStatus::Unknown);
    assert!(!status.is_terminal());
}

#[test]
fn test_run_status_terminal_set() {
    for status in [
        RunStatus::Completed,
        RunStatus::Failed,
        RunStatus::Cancelled,
        RunStatus::Expired,
        RunStatus::Incomplete,
    ] {
        assert!(status.is_terminal(), "{status} should be terminal");
    }
    for status in [
        RunStatus::Queued,
        RunStatus::InProgress,
        RunStatus::RequiresAction,
        RunStatus::Cancelling,
    ] {
        assert!(!status.is_terminal(), "{status} should not be terminal");
    }
    assert_eq!(RunStatus::RequiresAction.to_string(), "requires_action");
}

#[test]
fn test_message_text_skips_non_text_parts() {
    let message: ThreadMessage = serde_json::from_value(serde_json::json!({
        "id": "msg_1",
        "role": "assistant",
        "content": [
            {"type": "text", "text": {"value": "First", "annotations": []}},
            {"type": "image_file", "image_file": {"file_id": "file_1"}},
            {"type": "text", "text": {"value": "Second"}}
        ]
    }))
    .unwrap();

    assert_eq!(message.text(), "First\n\nSecond");
}

#[test]
fn test_latest_assistant_message_prefers_run() {
    let list: MessageList = serde_json::from_value(serde_json::json!({
        "object": "list",
        "data": [
            message("msg_4", "user", None, "late question"),
            message("msg_3", "assistant", Some("run_other"), "other run"),
            message("msg_2", "assistant", Some("run_1"), "answer"),
            message("msg_1", "user", None, "question")
        ],
        "has_more": false
    }))
    .unwrap();

    let reply = list.latest_assistant_message(Some("run_1")).unwrap();
    assert_eq!(reply.id, "msg_2");

    let newest = list.latest_assistant_message(None).unwrap();
    assert_eq!(newest.id, "msg_3");

    let fallback = list.latest_assistant_message(Some("run_missing")).unwrap();
    assert_eq!(fallback.id, "msg_3");
}

#[test]
fn test_latest_assistant_message_none() {
    let list: MessageList = serde_json::from_value(serde_json::json!({
        "data": [message("msg_1", "user", None, "question")]
    }))
    .unwrap();

    assert!(list.latest_assistant_message(Some("run_1")).is_none());
}

#[test]
fn test_create_params_serialization() {
    assert_eq!(
        serde_json::to_value(CreateMessageParams::user("Hello")).unwrap(),
        serde_json::json!({"role": "user", "content": "Hello"})
    );
    assert_eq!(
        serde_json::to_value(CreateRunParams {
            assistant_id: "asst_1".to_string()
        })
        .unwrap(),
        serde_json::json!({"assistant_id": "asst_1"})
    );
}
