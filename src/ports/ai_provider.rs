//! AI Provider Port - Interface for generative-text backends.
//!
//! The assistant treats a backend as text-in/text-out: a prompt plus
//! generation parameters go in, raw text comes out. The only behavior the
//! rest of the crate relies on beyond that is the error classification in
//! [`AIError::is_quota_exhausted`], which drives model fallback.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl AIProvider for EchoProvider {
//!     async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
//!         Ok(CompletionResponse::new(request.prompt, "echo"))
//!     }
//!
//!     fn provider_info(&self) -> ProviderInfo {
//!         ProviderInfo::new("echo", "echo-1")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for generative-text backends.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Generate a single completion for the request.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Full prompt text, including any conversation context.
    pub prompt: String,
    /// System instruction to guide model behavior.
    pub system_prompt: Option<String>,
    /// Sampling and length parameters.
    pub params: GenerationParams,
}

impl CompletionRequest {
    /// Creates a request with default generation parameters.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            params: GenerationParams::default(),
        }
    }

    /// Sets the system instruction.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the generation parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// Sampling and length parameters forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum tokens to generate.
    pub max_output_tokens: u32,
    /// Temperature for response randomness (0.0 = deterministic).
    pub temperature: f32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Top-k sampling threshold.
    pub top_k: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: 2048,
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

/// Response from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Generated raw text.
    pub content: String,
    /// Model that generated the response.
    pub model: String,
}

impl CompletionResponse {
    /// Creates a new response.
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
        }
    }
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "gemini").
    pub name: String,
    /// Model identifier (e.g., "gemini-1.5-flash").
    pub model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Markers that identify a quota or rate condition in a backend error message.
const QUOTA_MARKERS: &[&str] = &[
    "quota",
    "rate limit",
    "rate-limit",
    "ratelimit",
    "429",
    "resource_exhausted",
    "resource has been exhausted",
    "too many requests",
];

/// AI provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Provider quota for this model is used up.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Content was filtered for safety.
    #[error("content filtered: {reason}")]
    ContentFiltered {
        /// Reason for filtering.
        reason: String,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl AIError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a quota exceeded error.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded(message.into())
    }

    /// Creates a content filtered error.
    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if the backend signalled a temporary exhaustion of call
    /// allowance, which makes trying another model worthwhile.
    ///
    /// Besides the dedicated variants, any error whose message carries a
    /// quota marker counts: providers are inconsistent about status codes.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            AIError::RateLimited { .. } | AIError::QuotaExceeded(_) => true,
            AIError::AuthenticationFailed | AIError::Timeout { .. } => false,
            AIError::ContentFiltered { reason: message }
            | AIError::Unavailable { message }
            | AIError::Network(message)
            | AIError::Parse(message)
            | AIError::InvalidRequest(message) => has_quota_marker(message),
        }
    }
}

fn has_quota_marker(message: &str) -> bool {
    let lower = message.to_lowercase();
    QUOTA_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_builder_works() {
        let params = GenerationParams {
            max_output_tokens: 512,
            temperature: 0.2,
            top_p: 0.8,
            top_k: 20,
        };
        let request = CompletionRequest::new("What is a lease?")
            .with_system_prompt("Be precise")
            .with_params(params);

        assert_eq!(request.prompt, "What is a lease?");
        assert_eq!(request.system_prompt, Some("Be precise".to_string()));
        assert_eq!(request.params, params);
    }

    #[test]
    fn generation_params_have_sane_defaults() {
        let params = GenerationParams::default();
        assert_eq!(params.max_output_tokens, 2048);
        assert!(params.temperature > 0.0 && params.temperature < 1.0);
    }

    #[test]
    fn dedicated_variants_are_quota_class() {
        assert!(AIError::rate_limited(30).is_quota_exhausted());
        assert!(AIError::quota_exceeded("daily limit").is_quota_exhausted());
    }

    #[test]
    fn quota_markers_in_messages_are_quota_class() {
        assert!(AIError::unavailable("429 Too Many Requests").is_quota_exhausted());
        assert!(AIError::network("RESOURCE_EXHAUSTED: try later").is_quota_exhausted());
        assert!(AIError::InvalidRequest("Quota exceeded for model".into()).is_quota_exhausted());
    }

    #[test]
    fn other_errors_are_not_quota_class() {
        assert!(!AIError::AuthenticationFailed.is_quota_exhausted());
        assert!(!AIError::Timeout { timeout_secs: 30 }.is_quota_exhausted());
        assert!(!AIError::network("connection refused").is_quota_exhausted());
        assert!(!AIError::InvalidRequest("bad field".into()).is_quota_exhausted());
        assert!(!AIError::content_filtered("safety").is_quota_exhausted());
    }

    #[test]
    fn ai_error_displays_correctly() {
        assert_eq!(
            AIError::rate_limited(30).to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(
            AIError::quota_exceeded("free tier").to_string(),
            "quota exceeded: free tier"
        );
    }
}
