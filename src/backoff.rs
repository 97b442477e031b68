//! Exponential backoff with jitter for the distribution polling loop.

use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// Exponential backoff schedule.
///
/// Each interval is `current * (1 ± randomization_factor)`; `current` grows by
/// `multiplier` up to `max_interval`. The schedule ends once
/// `max_elapsed_time` has passed since [`ExponentialBackoff::start`].
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// First interval.
    pub initial_interval: Duration,
    /// Growth factor.
    pub multiplier: f64,
    /// Jitter fraction in `[0, 1]`.
    pub randomization_factor: f64,
    /// Interval ceiling.
    pub max_interval: Duration,
    /// Total time budget, `None` for unbounded.
    pub max_elapsed_time: Option<Duration>,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            randomization_factor: 0.5,
            max_interval: Duration::from_secs(60),
            max_elapsed_time: Some(Duration::from_secs(15 * 60)),
        }
    }
}

impl ExponentialBackoff {
    /// Cap the elapsed budget at `limit`.
    pub fn capped(mut self, limit: Option<Duration>) -> Self {
        self.max_elapsed_time = match (self.max_elapsed_time, limit) {
            (Some(own), Some(limit)) => Some(own.min(limit)),
            (own, None) => own,
            (None, limit) => limit,
        };
        self
    }

    /// Start the clock.
    pub fn start(self) -> Backoff {
        Backoff {
            current: self.initial_interval,
            started: Instant::now(),
            policy: self,
        }
    }
}

/// A running backoff schedule.
#[derive(Debug)]
pub struct Backoff {
    policy: ExponentialBackoff,
    current: Duration,
    started: Instant,
}

impl Backoff {
    /// Next sleep, or `None` when the elapsed budget would be exceeded.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        let delay = jitter(
            self.current,
            self.policy.randomization_factor,
            rand::thread_rng().gen::<f64>(),
        );
        self.current = self
            .current
            .mul_f64(self.policy.multiplier.max(1.0))
            .min(self.policy.max_interval);

        if let Some(budget) = self.policy.max_elapsed_time {
            if self.elapsed() + delay > budget {
                return None;
            }
        }
        Some(delay)
    }

    /// Time since the schedule started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Spread `interval` uniformly over `interval * (1 ± factor)` using `sample` in `[0, 1)`.
fn jitter(interval: Duration, factor: f64, sample: f64) -> Duration {
    if factor <= 0.0 {
        return interval;
    }
    let delta = interval.as_secs_f64() * factor;
    let low = interval.as_secs_f64() - delta;
    Duration::from_secs_f64((low + sample * 2.0 * delta).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(100),
            multiplier: 2.0,
            randomization_factor: 0.0,
            max_interval: Duration::from_millis(350),
            max_elapsed_time: None,
        }
    }

    #[test]
    fn test_intervals_grow_up_to_max() {
        let mut backoff = fixed().start();
        let delays: Vec<_> = (0..4).filter_map(|_| backoff.next_backoff()).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(350),
                Duration::from_millis(350),
            ]
        );
    }

    #[test]
    fn test_jitter_bounds() {
        let base = Duration::from_secs(2);
        assert_eq!(jitter(base, 0.5, 0.0), Duration::from_secs(1));
        assert_eq!(jitter(base, 0.5, 0.5), Duration::from_secs(2));
        assert!(jitter(base, 0.5, 0.999) < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_ends_at_max_elapsed() {
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_millis(250)),
            ..fixed()
        };
        let mut backoff = policy.start();

        let first = backoff.next_backoff().unwrap();
        tokio::time::sleep(first).await;
        assert!(backoff.next_backoff().is_none());
    }

    #[test]
    fn test_capped_takes_smaller_budget() {
        let capped = ExponentialBackoff::default().capped(Some(Duration::from_secs(30)));
        assert_eq!(capped.max_elapsed_time, Some(Duration::from_secs(30)));

        let uncapped = ExponentialBackoff::default().capped(None);
        assert_eq!(uncapped.max_elapsed_time, Some(Duration::from_secs(900)));
    }
}
