//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Generative-text backends and the failover dispatcher
//! - `rate_limiter` - Client-side admission control

pub mod ai;
pub mod rate_limiter;
