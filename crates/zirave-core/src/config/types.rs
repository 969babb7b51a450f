//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Base URL of the Generative Language API
    pub endpoint: String,

    /// Model used for text prompts
    pub text_model: String,

    /// Model used for image prompts
    pub vision_model: String,

    /// Name reported in the `model` field of image responses
    pub vision_label: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: format!("${{{API_KEY_ENV}}}"),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            text_model: "gemini-1.5-flash".to_string(),
            vision_model: "gemini-1.5-flash".to_string(),
            vision_label: "gemini-1.5-flash-vision".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_key_references_env() {
        assert_eq!(GeminiConfig::default().api_key, "${GEMINI_API_KEY}");
    }

    #[test]
    fn test_text_and_vision_share_model() {
        let cfg = GeminiConfig::default();
        assert_eq!(cfg.text_model, cfg.vision_model);
        assert_ne!(cfg.text_model, cfg.vision_label);
    }
}
