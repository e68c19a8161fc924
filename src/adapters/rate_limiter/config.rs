//! Rate governor configuration.
//!
//! Defines the two gates (minimum spacing and sliding-window cap) and a few
//! presets matching typical hosted-API tiers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ValidationError;

/// Governor limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Minimum spacing between admitted requests, in milliseconds.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Sliding window length, in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Maximum admissions within one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

impl GovernorConfig {
    /// Creates a configuration from explicit limits.
    ///
    /// Stored precision is milliseconds for the spacing and whole seconds for
    /// the window; both are rounded up so limits never loosen.
    pub fn new(min_interval: Duration, window: Duration, max_requests: u32) -> Self {
        let interval_ms = min_interval.as_millis()
            + u128::from(min_interval.subsec_nanos() % 1_000_000 > 0);
        Self {
            min_interval_ms: u64::try_from(interval_ms).unwrap_or(u64::MAX),
            window_secs: window.as_secs() + u64::from(window.subsec_nanos() > 0),
            max_requests,
        }
    }

    /// Slow burst floor for free-tier keys: 4s spacing, 15 per minute.
    pub fn conservative() -> Self {
        Self {
            min_interval_ms: 4_000,
            window_secs: 60,
            max_requests: 15,
        }
    }

    /// Paid-tier limits: 1s spacing, 30 per minute.
    pub fn relaxed() -> Self {
        Self {
            min_interval_ms: 1_000,
            window_secs: 60,
            max_requests: 30,
        }
    }

    /// Minimum spacing as a duration.
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Window length as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Validate governor limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_requests == 0 {
            return Err(ValidationError::InvalidGovernorCap);
        }
        if self.window_secs == 0 || self.min_interval() >= self.window() {
            return Err(ValidationError::InvalidGovernorWindow);
        }
        Ok(())
    }
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

fn default_min_interval_ms() -> u64 {
    1_000
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_requests() -> u32 {
    15
}
