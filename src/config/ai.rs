//! AI backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key
    pub api_key: Option<String>,

    /// API root URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model tried first
    #[serde(default = "default_primary_model")]
    pub primary_model: String,

    /// Model tried when the primary reports an exhausted quota
    #[serde(default = "default_secondary_model")]
    pub secondary_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("AI__API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.primary_model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI__PRIMARY_MODEL"));
        }
        if self.secondary_model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI__SECONDARY_MODEL"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            primary_model: default_primary_model(),
            secondary_model: default_secondary_model(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_primary_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_secondary_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_timeout() -> u64 {
    60
}
