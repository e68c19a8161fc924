//! Application configuration module
//!
//! This module provides type-safe configuration loading using the `config`
//! and `dotenvy` crates. Values come from an optional `legal-assistant.toml`
//! file, then from environment variables with the `LEGAL_ASSISTANT` prefix;
//! nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use legal_assistant::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Primary model: {}", config.ai.primary_model);
//! ```

mod ai;
mod chat;
mod error;
mod generation;
mod logging;

pub use ai::AiConfig;
pub use chat::ChatConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use logging::LoggingConfig;

pub use crate::adapters::rate_limiter::GovernorConfig;

use serde::Deserialize;
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "legal-assistant.toml";

const ENV_PREFIX: &str = "LEGAL_ASSISTANT";

/// Root application configuration
///
/// Every section has defaults except the API key, which
/// [`AppConfig::validate()`] requires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Backend configuration (key, models, timeout)
    #[serde(default)]
    pub ai: AiConfig,

    /// Client-side admission limits
    #[serde(default)]
    pub governor: GovernorConfig,

    /// Sampling parameters
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Conversation settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the default file and environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `legal-assistant.toml` from the working directory if present
    /// 3. Reads environment variables with `LEGAL_ASSISTANT` prefix
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LEGAL_ASSISTANT__AI__API_KEY=...` -> `ai.api_key = ...`
    /// - `LEGAL_ASSISTANT__GOVERNOR__MAX_REQUESTS=10` -> `governor.max_requests = 10`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration with an explicit file path. A missing file is not
    /// an error; environment variables override file values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.governor.validate()?;
        self.generation.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
