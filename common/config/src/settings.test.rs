use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.config_mode, ConfigMode::Personal);
    assert_eq!(settings.model, "gpt-4o-mini");
    assert_eq!(settings.game_system, "generic");
    assert_eq!(settings.context_length(), 5);
    assert_eq!(settings.temperature, 1.0);
    assert!(KNOWN_MODELS.iter().any(|(id, _)| *id == settings.model));
}

#[test]
fn test_partial_json_uses_defaults() {
    let settings: Settings = serde_json::from_str(
        r#"{"api_key": "sk-test", "assistant_id": "asst_1", "config_mode": "premium"}"#,
    )
    .unwrap();

    assert_eq!(settings.api_key, "sk-test");
    assert_eq!(settings.assistant_id, "asst_1");
    assert_eq!(settings.config_mode, ConfigMode::Managed);
    assert_eq!(settings.model, DEFAULT_MODEL);
    assert_eq!(settings.context_length, DEFAULT_CONTEXT_LENGTH);
}

#[test]
fn test_context_length_is_clamped() {
    let mut settings = Settings {
        context_length: 80,
        ..Default::default()
    };
    assert_eq!(settings.context_length(), 50);

    settings.context_length = -3;
    assert_eq!(settings.context_length(), 0);

    settings.context_length = 0;
    assert_eq!(settings.context_length(), 0);
}

#[test]
fn test_effective_prompt() {
    let mut settings = Settings {
        game_system: "pf2e".to_string(),
        ..Default::default()
    };
    assert_eq!(
        settings.effective_prompt(),
        GameSystem::find("pf2e").unwrap().prompt()
    );

    settings.game_prompt = "  You are a terse rules lawyer.  ".to_string();
    assert_eq!(settings.effective_prompt(), "You are a terse rules lawyer.");

    settings.game_prompt = "   ".to_string();
    settings.game_system = "unknown".to_string();
    assert_eq!(
        settings.effective_prompt(),
        GameSystem::find("generic").unwrap().prompt()
    );
}

#[test]
fn test_request_config_snapshot() {
    let settings = Settings {
        api_key: " sk-test ".to_string(),
        assistant_id: " asst_1 ".to_string(),
        context_length: 7,
        temperature: 0.4,
        base_url: Some("http://localhost:8080/v1".to_string()),
        ..Default::default()
    };

    let config = settings.request_config();
    assert_eq!(config.credential, "sk-test");
    assert_eq!(config.assistant_id, "asst_1");
    assert_eq!(config.context_length, 7);
    assert_eq!(config.temperature, 0.4);
    assert_eq!(config.base_url, "http://localhost:8080/v1");
    assert_eq!(config.mode, ConfigMode::Personal);

    assert_eq!(RequestConfig::default().base_url, DEFAULT_BASE_URL);
}

#[test]
fn test_debug_redacts_secrets() {
    let settings = Settings {
        api_key: "sk-secret".to_string(),
        license_code: "LIC-123".to_string(),
        ..Default::default()
    };

    let debug = format!("{settings:?}");
    assert!(!debug.contains("sk-secret"));
    assert!(!debug.contains("LIC-123"));
    assert!(debug.contains("[REDACTED]"));

    let debug = format!("{:?}", settings.request_config());
    assert!(!debug.contains("sk-secret"));

    let redacted = settings.redacted();
    assert_eq!(redacted.api_key, "[REDACTED]");
    assert_eq!(Settings::default().redacted().api_key, "");
}

#[test]
fn test_mode_serializes_lowercase() {
    assert_eq!(
        serde_json::to_value(ConfigMode::Managed).unwrap(),
        serde_json::json!("managed")
    );
    assert_eq!(ConfigMode::Personal.to_string(), "personal");
}
