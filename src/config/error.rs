//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid API base URL")]
    InvalidBaseUrl,

    #[error("Governor max_requests must be at least 1")]
    InvalidGovernorCap,

    #[error("Governor window must be positive and longer than min_interval")]
    InvalidGovernorWindow,

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("top_p must be in (0.0, 1.0]")]
    InvalidTopP,

    #[error("max_output_tokens must be at least 1")]
    InvalidMaxOutputTokens,

    #[error("Unknown log level: {0}")]
    InvalidLogLevel(String),
}
