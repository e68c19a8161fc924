//! Rate governor adapters.
//!
//! - `SlidingWindowGovernor` - In-process minimum-spacing plus sliding-window cap
//!
//! ## Usage
//!
//! ```ignore
//! use legal_assistant::adapters::rate_limiter::{GovernorConfig, SlidingWindowGovernor};
//!
//! let governor = SlidingWindowGovernor::new(GovernorConfig::conservative());
//! if governor.try_admit().is_ok() {
//!     // call the backend
//! }
//! ```

mod config;
mod sliding_window;

pub use config::GovernorConfig;
pub use sliding_window::SlidingWindowGovernor;
