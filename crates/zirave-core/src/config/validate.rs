//! Configuration validation.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let gemini = &self.gemini;
        if !(gemini.endpoint.starts_with("http://") || gemini.endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationError(
                "gemini.endpoint must be an http(s) URL".into(),
            ));
        }
        for (field, value) in [
            ("gemini.text_model", &gemini.text_model),
            ("gemini.vision_model", &gemini.vision_model),
            ("gemini.vision_label", &gemini.vision_label),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{field} must not be empty"
                )));
            }
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
