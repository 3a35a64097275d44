//! Stored settings and the per-call request configuration.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::game_system::DEFAULT_GAME_SYSTEM;
use crate::game_system::GameSystem;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Models offered for selection, with display labels. Other ids are accepted.
pub const KNOWN_MODELS: &[(&str, &str)] = &[
    ("gpt-4o", "GPT-4o (best quality)"),
    ("gpt-4o-mini", "GPT-4o mini (fast and cheap)"),
    ("gpt-3.5-turbo", "GPT-3.5 Turbo (legacy)"),
];

/// Default number of history turns sent with each question.
pub const DEFAULT_CONTEXT_LENGTH: i64 = 5;

/// Largest accepted context length.
pub const MAX_CONTEXT_LENGTH: i64 = 50;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 1.0;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const REDACTED: &str = "[REDACTED]";

/// How the user reaches the model service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigMode {
    /// The user's own API key, model and optional assistant.
    #[default]
    Personal,
    /// A managed service unlocked with a license code.
    #[serde(alias = "premium")]
    Managed,
}

impl fmt::Display for ConfigMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigMode::Personal => f.write_str("personal"),
            ConfigMode::Managed => f.write_str("managed"),
        }
    }
}

/// Settings as stored in `config.json`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub config_mode: ConfigMode,
    pub api_key: String,
    pub model: String,
    /// Assistant used for stateful conversations; empty selects chat completions.
    pub assistant_id: String,
    pub license_code: String,
    pub game_system: String,
    /// Custom system prompt replacing the game-system prompt when non-empty.
    pub game_prompt: String,
    pub context_length: i64,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_mode: ConfigMode::Personal,
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            assistant_id: String::new(),
            license_code: String::new(),
            game_system: DEFAULT_GAME_SYSTEM.to_string(),
            game_prompt: String::new(),
            context_length: DEFAULT_CONTEXT_LENGTH,
            temperature: DEFAULT_TEMPERATURE,
            base_url: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("config_mode", &self.config_mode)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("assistant_id", &self.assistant_id)
            .field("license_code", &redact(&self.license_code))
            .field("game_system", &self.game_system)
            .field("game_prompt", &self.game_prompt)
            .field("context_length", &self.context_length)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Settings {
    /// Context length clamped into `0..=50`.
    pub fn context_length(&self) -> usize {
        let clamped = self.context_length.clamp(0, MAX_CONTEXT_LENGTH);
        if clamped != self.context_length {
            warn!(
                configured = self.context_length,
                used = clamped,
                "context_length out of range"
            );
        }
        clamped as usize
    }

    /// The selected game system; unknown ids fall back to `generic`.
    pub fn game_system(&self) -> &'static GameSystem {
        GameSystem::find_or_default(&self.game_system)
    }

    /// The custom prompt when set, otherwise the game-system prompt.
    pub fn effective_prompt(&self) -> String {
        let custom = self.game_prompt.trim();
        if custom.is_empty() {
            self.game_system().prompt()
        } else {
            custom.to_string()
        }
    }

    /// Snapshot of these settings for one conversation call.
    pub fn request_config(&self) -> RequestConfig {
        RequestConfig {
            mode: self.config_mode,
            credential: self.api_key.trim().to_string(),
            model: self.model.clone(),
            system_prompt: self.effective_prompt(),
            context_length: self.context_length(),
            assistant_id: self.assistant_id.trim().to_string(),
            license_code: self.license_code.trim().to_string(),
            temperature: self.temperature,
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            api_key: redact(&self.api_key).to_string(),
            license_code: redact(&self.license_code).to_string(),
            ..self.clone()
        }
    }
}

/// Read-only configuration for a single conversation call.
#[derive(Clone, PartialEq)]
pub struct RequestConfig {
    pub mode: ConfigMode,
    /// Bearer credential for the model service.
    pub credential: String,
    pub model: String,
    pub system_prompt: String,
    /// Number of history turns sent with the question.
    pub context_length: usize,
    /// Empty selects the stateless chat path.
    pub assistant_id: String,
    pub license_code: String,
    pub temperature: f64,
    pub base_url: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Settings::default().request_config()
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("mode", &self.mode)
            .field("credential", &redact(&self.credential))
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("context_length", &self.context_length)
            .field("assistant_id", &self.assistant_id)
            .field("license_code", &redact(&self.license_code))
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn redact(secret: &str) -> &str {
    if secret.is_empty() { "" } else { REDACTED }
}

#[cfg(test)]
#[path = "settings.test.rs"]
mod tests;
