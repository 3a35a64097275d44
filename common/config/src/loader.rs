//! Settings file loading.
//!
//! Settings are read from `config.json` in the askgpt home directory and then
//! overlaid with environment variables.

use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ConfigError;
use crate::error::Result;
use crate::settings::Settings;

/// Default configuration directory name under the home directory.
pub const DEFAULT_CONFIG_DIR: &str = ".askgpt";

/// Settings file name (JSON).
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable for a custom askgpt home directory.
pub const ASKGPT_HOME_ENV: &str = "ASKGPT_HOME";

/// Environment variable that fills an empty `api_key`.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable that overrides `base_url`.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Get the default configuration directory path (`~/.askgpt`).
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_DIR)
}

/// Find the askgpt home directory.
///
/// Checks `ASKGPT_HOME` first, then falls back to `~/.askgpt`. A relative
/// `ASKGPT_HOME` is resolved against the current working directory.
pub fn find_askgpt_home() -> PathBuf {
    if let Ok(custom_home) = std::env::var(ASKGPT_HOME_ENV) {
        let path = PathBuf::from(&custom_home);
        if path.is_absolute() {
            return path;
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&custom_home))
            .unwrap_or_else(|_| PathBuf::from(custom_home))
    } else {
        default_config_dir()
    }
}

/// Overlay environment values onto settings.
///
/// `lookup` resolves a variable name; empty values are ignored.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if settings.api_key.trim().is_empty()
        && let Some(key) = value(API_KEY_ENV)
    {
        debug!("Using API key from {API_KEY_ENV}");
        settings.api_key = key;
    }
    if let Some(url) = value(BASE_URL_ENV) {
        debug!(base_url = %url, "Using base URL from {BASE_URL_ENV}");
        settings.base_url = Some(url);
    }
}

/// Loads and stores settings in a config directory.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            config_dir: find_askgpt_home(),
        }
    }
}

impl ConfigLoader {
    /// Create a loader for a specific config directory.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Get the config directory path.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the settings file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Ensure the config directory exists, creating it if necessary.
    pub fn ensure_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir).map_err(|source| ConfigError::Io {
                path: self.config_dir.clone(),
                source,
            })?;
            debug!(path = %self.config_dir.display(), "Created config directory");
        }
        Ok(())
    }

    /// Read the settings file; a missing file yields defaults.
    pub fn load_file(&self) -> Result<Settings> {
        let path = self.config_file();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        let settings = serde_json::from_str(&content)
            .map_err(|source| ConfigError::InvalidJson { file: path.clone(), source })?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Read the settings file and apply process environment overrides.
    pub fn load(&self) -> Result<Settings> {
        let mut settings = self.load_file()?;
        apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Write settings to the settings file, creating the directory if needed.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        self.ensure_dir()?;
        let path = self.config_file();
        let content = serde_json::to_string_pretty(settings)?;
        std::fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "Saved settings");
        Ok(())
    }
}

#[cfg(test)]
#[path = "loader.test.rs"]
mod tests;
