//! Property tests for the sliding-window governor.
//!
//! Schedules are generated as millisecond gaps between consecutive attempts
//! and replayed through the `*_at` API, so no test sleeps.

use proptest::prelude::*;
use std::time::{Duration, Instant};

use legal_assistant::adapters::rate_limiter::{GovernorConfig, SlidingWindowGovernor};

fn governor(min_interval_ms: u64, window_secs: u64, max_requests: u32) -> SlidingWindowGovernor {
    SlidingWindowGovernor::new(GovernorConfig::new(
        Duration::from_millis(min_interval_ms),
        Duration::from_secs(window_secs),
        max_requests,
    ))
}

/// Replays `gaps` and returns the admitted instants.
fn admitted(governor: &SlidingWindowGovernor, start: Instant, gaps: &[u64]) -> Vec<Instant> {
    let mut now = start;
    let mut admitted = Vec::new();
    for gap in gaps {
        now += Duration::from_millis(*gap);
        if governor.try_admit_at(now).is_ok() {
            admitted.push(now);
        }
    }
    admitted
}

proptest! {
    #[test]
    fn admissions_respect_minimum_spacing(
        min_interval_ms in 0u64..3_000,
        window_secs in 1u64..120,
        max_requests in 1u32..30,
        gaps in prop::collection::vec(0u64..2_500, 1..200),
    ) {
        let governor = governor(min_interval_ms, window_secs, max_requests);
        let admitted = admitted(&governor, Instant::now(), &gaps);

        for pair in admitted.windows(2) {
            prop_assert!(pair[1] - pair[0] >= Duration::from_millis(min_interval_ms));
        }
    }

    #[test]
    fn admissions_respect_window_cap(
        min_interval_ms in 0u64..1_000,
        window_secs in 1u64..30,
        max_requests in 1u32..20,
        gaps in prop::collection::vec(0u64..1_500, 1..300),
    ) {
        let window = Duration::from_secs(window_secs);
        let governor = governor(min_interval_ms, window_secs, max_requests);
        let admitted = admitted(&governor, Instant::now(), &gaps);

        for (i, &t) in admitted.iter().enumerate() {
            let in_window = admitted[..=i]
                .iter()
                .filter(|&&earlier| t - earlier < window)
                .count();
            prop_assert!(in_window <= max_requests as usize);
        }
    }

    #[test]
    fn wait_is_zero_exactly_when_admissible(
        min_interval_ms in 0u64..3_000,
        window_secs in 1u64..60,
        max_requests in 1u32..10,
        gaps in prop::collection::vec(0u64..4_000, 1..100),
    ) {
        let governor = governor(min_interval_ms, window_secs, max_requests);
        let mut now = Instant::now();

        for gap in gaps {
            now += Duration::from_millis(gap);
            let wait = governor.time_until_next_admission_at(now);
            prop_assert_eq!(wait.is_zero(), governor.check_admission_at(now));

            match governor.try_admit_at(now) {
                Ok(()) => prop_assert!(wait.is_zero()),
                Err(denied_wait) => prop_assert_eq!(denied_wait, wait),
            }
        }
    }

    #[test]
    fn check_does_not_admit(
        checks in 1usize..50,
    ) {
        let governor = governor(1_000, 60, 15);
        let now = Instant::now();

        for _ in 0..checks {
            prop_assert!(governor.check_admission_at(now));
        }
        prop_assert_eq!(governor.admitted_in_window_at(now), 0);
    }
}

#[test]
fn twenty_rapid_checks_admit_only_the_first() {
    let governor = governor(1_000, 60, 15);
    let start = Instant::now();

    let results: Vec<bool> = (0..20u64)
        .map(|i| governor.try_admit_at(start + Duration::from_millis(i * 50)).is_ok())
        .collect();

    assert!(results[0]);
    assert!(results[1..].iter().all(|admitted| !admitted));
}

#[test]
fn cap_blocks_even_when_spacing_is_satisfied() {
    let governor = governor(1_000, 60, 15);
    let start = Instant::now();

    for i in 0..15u64 {
        assert!(governor.try_admit_at(start + Duration::from_secs(i * 2)).is_ok());
    }

    let now = start + Duration::from_secs(30);
    assert_eq!(
        governor.try_admit_at(now),
        Err(Duration::from_secs(30)),
        "oldest record expires 60s after start"
    );
    assert!(governor.try_admit_at(start + Duration::from_secs(60)).is_ok());
}
