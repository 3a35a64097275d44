use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_params_serialization() {
    let params = ChatCompletionParams::new(
        "gpt-4o-mini",
        vec![ChatMessage::system("Be brief."), ChatMessage::user("Hi")],
    )
    .temperature(0.5);

    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hi"}
            ],
            "temperature": 0.5
        })
    );
}

#[test]
fn test_params_omit_unset_temperature() {
    let params = ChatCompletionParams::new("gpt-4o", vec![ChatMessage::user("Hi")]);
    let json = serde_json::to_value(&params).unwrap();
    assert!(json.get("temperature").is_none());
}

#[test]
fn test_completion_text() {
    let completion: ChatCompletion = serde_json::from_value(serde_json::json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "<p>Hello</p>"}, "finish_reason": "stop"},
            {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
        ],
        "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
    }))
    .unwrap();

    assert_eq!(completion.text(), Some("<p>Hello</p>"));
    assert_eq!(completion.usage.unwrap().total_tokens, 12);
}

#[test]
fn test_completion_text_missing() {
    let empty: ChatCompletion = serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
    assert_eq!(empty.text(), None);

    let refusal: ChatCompletion = serde_json::from_value(serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": null, "refusal": "no"}}]
    }))
    .unwrap();
    assert_eq!(refusal.text(), None);

    let blank: ChatCompletion = serde_json::from_value(serde_json::json!({
        "choices": [{"message": {"content": "  \n"}}]
    }))
    .unwrap();
    assert_eq!(blank.text(), None);
}
