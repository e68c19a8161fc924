//! Once-per-second countdown of the governor's wait time.

use futures::stream::{self, Stream};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use super::errors::ceil_secs;
use crate::ports::RateGovernor;

/// Yields the seconds until the next admission once per second, starting
/// immediately, and ends after yielding 0.
///
/// Read-only: the governor is only queried, never recorded against.
pub fn cooldown_stream(governor: Arc<dyn RateGovernor>) -> impl Stream<Item = u64> {
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    stream::unfold(
        (governor, ticker, false),
        |(governor, mut ticker, finished)| async move {
            if finished {
                return None;
            }
            ticker.tick().await;
            let remaining = ceil_secs(governor.time_until_next_admission());
            Some((remaining, (governor, ticker, remaining == 0)))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::UnlimitedGovernor;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Reports one second less on every query.
    struct DrainingGovernor {
        remaining_secs: AtomicU64,
    }

    impl RateGovernor for DrainingGovernor {
        fn check_admission(&self) -> bool {
            self.remaining_secs.load(Ordering::SeqCst) == 0
        }

        fn record_admission(&self) {}

        fn time_until_next_admission(&self) -> Duration {
            let current = self.remaining_secs.load(Ordering::SeqCst);
            self.remaining_secs
                .store(current.saturating_sub(1), Ordering::SeqCst);
            Duration::from_secs(current)
        }
    }

    #[tokio::test]
    async fn ready_governor_yields_single_zero() {
        let ticks: Vec<u64> = cooldown_stream(Arc::new(UnlimitedGovernor)).collect().await;
        assert_eq!(ticks, vec![0]);
    }

    #[tokio::test]
    async fn counts_down_to_zero_then_ends() {
        let governor = Arc::new(DrainingGovernor {
            remaining_secs: AtomicU64::new(1),
        });

        let ticks: Vec<u64> = cooldown_stream(governor).collect().await;

        assert_eq!(ticks, vec![1, 0]);
    }
}
