//! Per-handler minimum interval between network round-trips.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// A fixed-interval rate limiter owned by one handler instance.
///
/// The lock is held across the sleep, so concurrent callers on the same
/// handler queue up and each starts at least one interval after the last.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_io: Mutex<Option<Instant>>,
}

impl Throttle {
    /// `seconds` is the minimum gap between two round-trips; zero, negative
    /// or non-finite values disable throttling.
    pub fn new(seconds: f64) -> Self {
        let interval = if seconds.is_finite() && seconds > 0.0 {
            Duration::from_secs_f64(seconds)
        } else {
            Duration::ZERO
        };

        Self {
            interval,
            last_io: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time of the last recorded round-trip
    pub async fn last_io(&self) -> Option<Instant> {
        *self.last_io.lock().await
    }

    /// Waits until the next round-trip may start, then records it.
    ///
    /// `last_io` replaces the recorded timestamp before the computation.
    /// `wait` forces a sleep of exactly that long instead of the computed
    /// remainder.
    pub async fn throttle(&self, last_io: Option<Instant>, wait: Option<Duration>) {
        let mut recorded = self.last_io.lock().await;

        if last_io.is_some() {
            *recorded = last_io;
        }

        if let Some(wait) = wait {
            debug!("Throttling forced for {:.3}s", wait.as_secs_f64());
            sleep(wait).await;
        } else if let Some(previous) = *recorded {
            if !self.interval.is_zero() {
                let elapsed = Instant::now().saturating_duration_since(previous);
                if elapsed < self.interval {
                    let remaining = self.interval - elapsed;
                    debug!("Throttling for {:.3}s", remaining.as_secs_f64());
                    sleep(remaining).await;
                }
            }
        }

        *recorded = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_are_spaced() {
        let throttle = Throttle::new(1.0);
        let start = Instant::now();

        throttle.throttle(None, None).await;
        assert!(start.elapsed() < Duration::from_millis(1));

        throttle.throttle(None, None).await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_remaining_time_is_slept() {
        let throttle = Throttle::new(1.0);
        throttle.throttle(None, None).await;

        sleep(Duration::from_millis(600)).await;
        let before = Instant::now();
        throttle.throttle(None, None).await;

        let waited = before.elapsed();
        assert!(waited >= Duration::from_millis(400));
        assert!(waited < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rate_records_without_sleeping() {
        let throttle = Throttle::new(0.0);
        let start = Instant::now();

        throttle.throttle(None, None).await;
        throttle.throttle(None, None).await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(throttle.last_io().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_wait_overrides_interval() {
        let throttle = Throttle::new(10.0);
        throttle.throttle(None, None).await;

        let before = Instant::now();
        throttle.throttle(None, Some(Duration::from_secs(2))).await;
        assert_eq!(before.elapsed(), Duration::from_secs(2));

        let disabled = Throttle::new(0.0);
        let before = Instant::now();
        disabled.throttle(None, Some(Duration::from_millis(250))).await;
        assert_eq!(before.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_supplied_last_io_is_used() {
        let throttle = Throttle::new(5.0);
        let long_ago = Instant::now();
        sleep(Duration::from_secs(10)).await;

        let before = Instant::now();
        throttle.throttle(Some(long_ago), None).await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_are_serialised() {
        let throttle = Arc::new(Throttle::new(1.0));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let throttle = Arc::clone(&throttle);
                tokio::spawn(async move { throttle.throttle(None, None).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_rates_disable() {
        assert!(Throttle::new(-1.0).interval().is_zero());
        assert!(Throttle::new(f64::NAN).interval().is_zero());
        assert_eq!(Throttle::new(0.5).interval(), Duration::from_millis(500));
    }
}
