//! Configuration management for ZİRAVE.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so an absent file or a
//! partial one both work.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::prompts::{FallbackText, PromptCatalog};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for ZİRAVE.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini provider settings
    pub gemini: GeminiConfig,

    /// Prompt templates
    pub prompts: PromptCatalog,

    /// Fixed texts for fallback and error records
    pub fallback: FallbackText,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path (with ~ expansion).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path.to_string_lossy();
        let expanded = PathBuf::from(shellexpand::tilde(&path_str).into_owned());
        let content = std::fs::read_to_string(&expanded)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.zirave.zirave/config.toml
    /// - Linux: ~/.config/zirave/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\zirave\zirave\config\config.toml
    ///
    /// Falls back to ~/.zirave/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "zirave", "zirave")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".zirave").join("config.toml")
            })
    }

    /// Resolve the Gemini credential.
    ///
    /// `${VAR}` values are looked up in the environment. An unset variable or
    /// an empty result is a [`ConfigError::MissingCredential`].
    pub fn api_key(&self) -> Result<String, ConfigError> {
        resolve_env_var(&self.gemini.api_key)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                var: env_var_name(&self.gemini.api_key)
                    .unwrap_or(API_KEY_ENV)
                    .to_string(),
            })
    }

    /// A copy safe to display: a literal `gemini.api_key` is masked.
    ///
    /// `${VAR}` references and an empty key are kept as written, since they
    /// carry no secret.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        let key = &config.gemini.api_key;
        if !key.is_empty() && env_var_name(key).is_none() {
            config.gemini.api_key = REDACTED.to_string();
        }
        config
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Placeholder shown instead of a literal credential.
pub const REDACTED: &str = "********";

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if let Some(var_name) = env_var_name(value) {
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn env_var_name(value: &str) -> Option<&str> {
    value.strip_prefix("${").and_then(|v| v.strip_suffix('}'))
}
