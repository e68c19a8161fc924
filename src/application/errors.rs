//! Errors surfaced to the assistant's callers.

use std::time::Duration;
use thiserror::Error;

use crate::adapters::ai::DispatchError;
use crate::ports::AIError;

/// Errors that can occur when asking the assistant.
///
/// Malformed model output is never an error here; the normalizer absorbs it.
#[derive(Debug, Clone, Error)]
pub enum AssistantError {
    /// The local governor refused the request.
    #[error("Rate limited locally: retry after {retry_after:?}")]
    LocallyRateLimited { retry_after: Duration },

    /// Every model tier reported an exhausted quota.
    #[error("All model tiers exhausted after {attempts} attempts")]
    BackendQuotaExhausted { attempts: u32 },

    /// Any other backend failure, passed through unchanged.
    #[error("AI provider error: {0}")]
    Backend(AIError),

    /// A required input was empty or whitespace only.
    #[error("Validation error: {0} cannot be empty")]
    EmptyInput(&'static str),
}

impl From<DispatchError> for AssistantError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::LocallyRateLimited { retry_after } => {
                AssistantError::LocallyRateLimited { retry_after }
            }
            DispatchError::AllBackendsExhausted { attempts, .. } => {
                AssistantError::BackendQuotaExhausted { attempts }
            }
            DispatchError::Backend(err) => AssistantError::Backend(err),
        }
    }
}

impl AssistantError {
    /// Remaining wait, when known.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            AssistantError::LocallyRateLimited { retry_after } => Some(*retry_after),
            AssistantError::Backend(AIError::RateLimited { retry_after_secs }) => {
                Some(Duration::from_secs(u64::from(*retry_after_secs)))
            }
            _ => None,
        }
    }

    /// Message suitable for showing to the person who submitted the request.
    pub fn user_message(&self) -> String {
        match self {
            AssistantError::LocallyRateLimited { retry_after } => format!(
                "You're sending requests too quickly. Please wait {} seconds and try again.",
                ceil_secs(*retry_after).max(1)
            ),
            AssistantError::BackendQuotaExhausted { .. } => {
                "The legal assistant is receiving too many requests right now. Please try again later."
                    .to_string()
            }
            AssistantError::Backend(err) => match err {
                AIError::AuthenticationFailed => {
                    "The assistant could not authenticate with the AI service. Check the API key."
                        .to_string()
                }
                AIError::Network(_) | AIError::Timeout { .. } | AIError::Unavailable { .. } => {
                    "The AI service could not be reached. Check your connection and try again."
                        .to_string()
                }
                AIError::ContentFiltered { .. } => {
                    "The AI service declined to answer this request. Try rephrasing your question."
                        .to_string()
                }
                other => format!("Something went wrong while contacting the AI service: {}", other),
            },
            AssistantError::EmptyInput(field) => format!("Please enter a {}.", field),
        }
    }
}

/// Whole seconds, rounded up.
pub(crate) fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
