//! Rate governor port - client-side admission control for outbound calls.
//!
//! A governor combines two independent gates: a minimum spacing between
//! admitted requests (burst floor) and a cap on admissions within a trailing
//! window (per-minute quota). It is a best-effort guard against exhausting a
//! third-party quota, not a correctness-critical limiter.

use std::time::Duration;

/// Port for admission control.
///
/// Implementations must be thread-safe. `check_admission` and
/// `record_admission` are separate calls; callers that need them to be
/// indivisible use [`RateGovernor::try_admit`].
pub trait RateGovernor: Send + Sync {
    /// Returns true if a request may be admitted right now. Does not admit.
    fn check_admission(&self) -> bool;

    /// Records an admitted request at the current instant.
    fn record_admission(&self);

    /// Time until `check_admission` would return true; zero when it already does.
    ///
    /// For display purposes only (countdowns), not for scheduling.
    fn time_until_next_admission(&self) -> Duration;

    /// Checks and records in one step.
    ///
    /// Returns the remaining wait when the request is not admitted. The
    /// default is not atomic; implementations with internal locking should
    /// override it.
    fn try_admit(&self) -> Result<(), Duration> {
        if self.check_admission() {
            self.record_admission();
            Ok(())
        } else {
            Err(self.time_until_next_admission())
        }
    }
}

/// A governor that admits everything. Useful for tools and tests that do not
/// exercise admission control.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlimitedGovernor;

impl RateGovernor for UnlimitedGovernor {
    fn check_admission(&self) -> bool {
        true
    }

    fn record_admission(&self) {}

    fn time_until_next_admission(&self) -> Duration {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_governor_always_admits() {
        let governor = UnlimitedGovernor;
        for _ in 0..100 {
            assert!(governor.try_admit().is_ok());
        }
        assert_eq!(governor.time_until_next_admission(), Duration::ZERO);
    }
}
