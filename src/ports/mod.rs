//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Generative-text backend
//! - `RateGovernor` - Client-side admission control

mod ai_provider;
mod rate_governor;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, GenerationParams, ProviderInfo,
};
pub use rate_governor::{RateGovernor, UnlimitedGovernor};
