//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port plus the dispatcher that gates and
//! routes calls across model tiers.
//!
//! ## Available Adapters
//!
//! - `GeminiProvider` - Google generative language API, one model per instance
//! - `MockAIProvider` - Configurable mock for testing
//! - `FailoverDispatcher` - Governor admission plus primary/secondary fallback

mod failover_dispatcher;
mod gemini_provider;
mod mock_provider;

pub use failover_dispatcher::{
    events as dispatch_events, AIEventCallback, BackendTarget, DispatchError, FailoverDispatcher,
    ModelTier, NoOpEventCallback,
};
pub use gemini_provider::{
    map_error_status, text_from_response, GeminiConfig, GeminiProvider, GenerateResponse,
    DEFAULT_BASE_URL, DEFAULT_MODEL,
};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
