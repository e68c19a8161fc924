//! In-process sliding-window rate governor.
//!
//! Keeps the instants of admitted requests in a deque. Expired records are
//! pruned lazily whenever the governor is consulted, so there is no
//! background work. State lives only as long as the governor.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::ports::RateGovernor;

use super::config::GovernorConfig;

/// Sliding-window governor with a minimum spacing between admissions.
///
/// Every operation also has an `*_at` form taking an explicit instant, so
/// behavior can be tested without sleeping.
#[derive(Debug)]
pub struct SlidingWindowGovernor {
    config: GovernorConfig,
    state: Mutex<GovernorState>,
}

#[derive(Debug, Default)]
struct GovernorState {
    /// Admission instants, oldest first.
    records: VecDeque<Instant>,
    last_admitted: Option<Instant>,
}

impl GovernorState {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.records.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.records.pop_front();
            } else {
                break;
            }
        }
    }

    /// Spacing gate first, then the window cap. Zero means admissible.
    fn wait_time(&self, now: Instant, config: &GovernorConfig) -> Duration {
        if let Some(last) = self.last_admitted {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < config.min_interval() {
                return config.min_interval() - elapsed;
            }
        }

        if self.records.len() >= config.max_requests as usize {
            if let Some(&oldest) = self.records.front() {
                return config
                    .window()
                    .saturating_sub(now.saturating_duration_since(oldest));
            }
        }

        Duration::ZERO
    }

    fn record(&mut self, now: Instant) {
        self.records.push_back(now);
        self.last_admitted = Some(now);
    }
}

impl SlidingWindowGovernor {
    /// Creates a governor with the given limits.
    pub fn new(config: GovernorConfig) -> Self {
        Self {
            config,
            state: Mutex::new(GovernorState::default()),
        }
    }

    /// Creates a governor with default limits.
    pub fn with_defaults() -> Self {
        Self::new(GovernorConfig::default())
    }

    /// Returns the configured limits.
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Whether a request could be admitted at `now`.
    pub fn check_admission_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock();
        state.prune(now, self.config.window());
        state.wait_time(now, &self.config).is_zero()
    }

    /// Records an admission at `now`.
    pub fn record_admission_at(&self, now: Instant) {
        let mut state = self.state.lock();
        state.prune(now, self.config.window());
        state.record(now);
    }

    /// Remaining wait at `now`; zero iff `check_admission_at(now)`.
    pub fn time_until_next_admission_at(&self, now: Instant) -> Duration {
        let mut state = self.state.lock();
        state.prune(now, self.config.window());
        state.wait_time(now, &self.config)
    }

    /// Checks and records at `now` under one lock acquisition.
    pub fn try_admit_at(&self, now: Instant) -> Result<(), Duration> {
        let mut state = self.state.lock();
        state.prune(now, self.config.window());

        let wait = state.wait_time(now, &self.config);
        if wait.is_zero() {
            state.record(now);
            Ok(())
        } else {
            debug!(
                wait_ms = wait.as_millis() as u64,
                in_window = state.records.len(),
                "Admission denied"
            );
            Err(wait)
        }
    }

    /// Number of admissions still inside the window at `now`.
    pub fn admitted_in_window_at(&self, now: Instant) -> usize {
        let mut state = self.state.lock();
        state.prune(now, self.config.window());
        state.records.len()
    }

    /// Forgets all recorded admissions.
    pub fn reset(&self) {
        *self.state.lock() = GovernorState::default();
    }
}

impl Default for SlidingWindowGovernor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RateGovernor for SlidingWindowGovernor {
    fn check_admission(&self) -> bool {
        self.check_admission_at(Instant::now())
    }

    fn record_admission(&self) {
        self.record_admission_at(Instant::now())
    }

    fn time_until_next_admission(&self) -> Duration {
        self.time_until_next_admission_at(Instant::now())
    }

    fn try_admit(&self) -> Result<(), Duration> {
        self.try_admit_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governor(min_interval_ms: u64, window_secs: u64, max_requests: u32) -> SlidingWindowGovernor {
        SlidingWindowGovernor::new(GovernorConfig {
            min_interval_ms,
            window_secs,
            max_requests,
        })
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // ─── Spacing Gate ────────────────────────────────────────────────

    #[test]
    fn fresh_governor_admits() {
        let g = governor(1_000, 60, 15);
        let t0 = Instant::now();
        assert!(g.check_admission_at(t0));
        assert_eq!(g.time_until_next_admission_at(t0), Duration::ZERO);
    }

    #[test]
    fn check_does_not_admit() {
        let g = governor(1_000, 60, 15);
        let t0 = Instant::now();
        assert!(g.check_admission_at(t0));
        assert!(g.check_admission_at(t0));
        assert_eq!(g.admitted_in_window_at(t0), 0);
    }

    #[test]
    fn spacing_blocks_until_interval_elapses() {
        let g = governor(1_000, 60, 15);
        let t0 = Instant::now();
        g.record_admission_at(t0);

        assert!(!g.check_admission_at(t0 + ms(400)));
        assert_eq!(g.time_until_next_admission_at(t0 + ms(400)), ms(600));
        assert!(g.check_admission_at(t0 + ms(1_000)));
    }

    #[test]
    fn twenty_rapid_calls_admit_only_the_first() {
        let g = governor(1_000, 60, 15);
        let t0 = Instant::now();

        let admitted: Vec<bool> = (0..20)
            .map(|i| g.try_admit_at(t0 + ms(i * 50)).is_ok())
            .collect();

        assert!(admitted[0]);
        assert!(admitted[1..].iter().all(|a| !a));
        assert_eq!(g.admitted_in_window_at(t0 + ms(999)), 1);
    }

    // ─── Window Cap ──────────────────────────────────────────────────

    #[test]
    fn cap_blocks_until_oldest_record_expires() {
        let g = governor(1_000, 60, 3);
        let t0 = Instant::now();
        for i in 0..3 {
            assert!(g.try_admit_at(t0 + Duration::from_secs(i * 2)).is_ok());
        }

        let now = t0 + Duration::from_secs(10);
        assert!(!g.check_admission_at(now));
        assert_eq!(g.time_until_next_admission_at(now), Duration::from_secs(50));

        let after_expiry = t0 + Duration::from_secs(60);
        assert!(g.check_admission_at(after_expiry));
        assert_eq!(g.admitted_in_window_at(after_expiry), 2);
    }

    #[test]
    fn spacing_wait_reported_before_cap_wait() {
        let g = governor(5_000, 60, 1);
        let t0 = Instant::now();
        g.record_admission_at(t0);

        assert_eq!(g.time_until_next_admission_at(t0 + ms(1_000)), ms(4_000));
        assert_eq!(
            g.time_until_next_admission_at(t0 + ms(6_000)),
            Duration::from_secs(54)
        );
    }

    #[test]
    fn try_admit_reports_wait_when_denied() {
        let g = governor(2_000, 60, 15);
        let t0 = Instant::now();
        assert!(g.try_admit_at(t0).is_ok());
        assert_eq!(g.try_admit_at(t0 + ms(500)), Err(ms(1_500)));
    }

    #[test]
    fn record_without_check_still_counts() {
        let g = governor(1_000, 60, 2);
        let t0 = Instant::now();
        g.record_admission_at(t0);
        g.record_admission_at(t0);

        assert_eq!(g.admitted_in_window_at(t0), 2);
        assert!(!g.check_admission_at(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn reset_clears_history() {
        let g = governor(1_000, 60, 1);
        let t0 = Instant::now();
        g.record_admission_at(t0);
        g.reset();
        assert!(g.check_admission_at(t0));
    }

    // ─── Port ────────────────────────────────────────────────────────

    #[test]
    fn port_methods_use_current_time() {
        let g = governor(60_000, 120, 15);
        assert!(g.check_admission());
        assert!(g.try_admit().is_ok());
        assert!(!g.check_admission());
        assert!(g.time_until_next_admission() > Duration::from_secs(59));
        assert!(g.try_admit().is_err());
    }
}
