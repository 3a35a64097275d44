use super::*;
use crate::settings::ConfigMode;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let loader = ConfigLoader::from_path(dir.path().join("absent"));

    let settings = loader.load_file().unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_load_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE),
        r#"{"api_key": "sk-file", "model": "gpt-4o", "context_length": 10, "config_mode": "personal"}"#,
    )
    .unwrap();

    let settings = ConfigLoader::from_path(dir.path()).load_file().unwrap();
    assert_eq!(settings.api_key, "sk-file");
    assert_eq!(settings.model, "gpt-4o");
    assert_eq!(settings.context_length, 10);
    assert_eq!(settings.config_mode, ConfigMode::Personal);
}

#[test]
fn test_invalid_json_reports_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();

    let error = ConfigLoader::from_path(dir.path()).load_file().unwrap_err();
    match error {
        ConfigError::InvalidJson { file, .. } => assert_eq!(file, dir.path().join(CONFIG_FILE)),
        other => panic!("expected InvalidJson, got {other:?}"),
    }
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let loader = ConfigLoader::from_path(dir.path().join("nested"));
    let settings = Settings {
        api_key: "sk-saved".to_string(),
        assistant_id: "asst_1".to_string(),
        game_system: "dnd5e".to_string(),
        ..Default::default()
    };

    loader.save(&settings).unwrap();
    assert!(loader.config_file().exists());
    assert_eq!(loader.load_file().unwrap(), settings);
}

#[test]
fn test_env_fills_empty_api_key_only() {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, env(&[(API_KEY_ENV, "sk-env")]));
    assert_eq!(settings.api_key, "sk-env");

    let mut settings = Settings {
        api_key: "sk-file".to_string(),
        ..Default::default()
    };
    apply_env_overrides(&mut settings, env(&[(API_KEY_ENV, "sk-env")]));
    assert_eq!(settings.api_key, "sk-file");
}

#[test]
fn test_env_overrides_base_url() {
    let mut settings = Settings {
        base_url: Some("https://file.example/v1".to_string()),
        ..Default::default()
    };
    apply_env_overrides(&mut settings, env(&[(BASE_URL_ENV, "http://localhost:1234/v1")]));
    assert_eq!(settings.base_url.as_deref(), Some("http://localhost:1234/v1"));

    apply_env_overrides(&mut settings, env(&[(BASE_URL_ENV, "  ")]));
    assert_eq!(settings.base_url.as_deref(), Some("http://localhost:1234/v1"));
}

#[test]
fn test_default_config_dir_name() {
    assert!(default_config_dir().ends_with(DEFAULT_CONFIG_DIR));
}
