//! Backoff strategies shared by the connection manager, retry layer and
//! worker dispatch loop.

use std::time::Duration;

/// Abstraction for computing retry/reconnect intervals.
///
/// Every component that waits before trying again — the connection
/// manager's recovery loop, the retry layer, the worker's per-call retry —
/// is parameterized over this trait instead of hardcoding a formula.
pub trait IntervalFunction: Send + Sync {
    /// Computes the delay before the next attempt.
    ///
    /// `attempt` is 0-indexed: the first retry is attempt 0.
    fn next_interval(&self, attempt: usize) -> Duration;
}

/// Fixed interval backoff - returns the same duration for every retry.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    duration: Duration,
}

impl FixedInterval {
    /// Creates a new fixed interval backoff.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl IntervalFunction for FixedInterval {
    fn next_interval(&self, _attempt: usize) -> Duration {
        self.duration
    }
}

/// Exponential backoff with configurable multiplier and optional cap.
///
/// Grounds the connection manager's recovery delay (1s, 2s, 4s, capped at
/// three attempts) and the worker's per-call retry window (2-10s).
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    multiplier: f64,
    max_interval: Option<Duration>,
}

impl ExponentialBackoff {
    /// Creates exponential backoff with the default multiplier of 2.0.
    pub fn new(initial_interval: Duration) -> Self {
        Self {
            initial_interval,
            multiplier: 2.0,
            max_interval: None,
        }
    }

    /// Sets the multiplier for exponential growth.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Caps the interval at `max_interval`.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let multiplier = self.multiplier.powi(attempt as i32);
        let interval = self.initial_interval.mul_f64(multiplier);

        if let Some(max) = self.max_interval {
            interval.min(max)
        } else {
            interval
        }
    }
}

/// Exponential backoff with jitter, to avoid thundering herds on shared
/// resources like the connection pool or a tripped circuit's reset window.
#[derive(Debug, Clone)]
pub struct ExponentialRandomBackoff {
    initial_interval: Duration,
    multiplier: f64,
    randomization_factor: f64,
    max_interval: Option<Duration>,
}

impl ExponentialRandomBackoff {
    /// `randomization_factor` of 0.5 randomizes the interval between 50%
    /// and 150% of the calculated value.
    pub fn new(initial_interval: Duration, randomization_factor: f64) -> Self {
        Self {
            initial_interval,
            multiplier: 2.0,
            randomization_factor: randomization_factor.clamp(0.0, 1.0),
            max_interval: None,
        }
    }

    /// Sets the multiplier for exponential growth.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Caps the interval at `max_interval` before jitter is applied.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }

    fn randomize(&self, duration: Duration) -> Duration {
        use rand::Rng;
        let mut rng = rand::rng();
        let delta = duration.as_secs_f64() * self.randomization_factor;
        let min = duration.as_secs_f64() - delta;
        let max = duration.as_secs_f64() + delta;
        let randomized = rng.random_range(min..=max);
        Duration::from_secs_f64(randomized.max(0.0))
    }
}

impl IntervalFunction for ExponentialRandomBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let multiplier = self.multiplier.powi(attempt as i32);
        let interval = self.initial_interval.mul_f64(multiplier);

        let capped = if let Some(max) = self.max_interval {
            interval.min(max)
        } else {
            interval
        };

        self.randomize(capped)
    }
}

/// Function-based interval for callers with a bespoke schedule.
pub struct FnInterval<F> {
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    /// Creates a new function-based interval.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn next_interval(&self, attempt: usize) -> Duration {
        (self.f)(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_interval_returns_same_duration() {
        let backoff = FixedInterval::new(Duration::from_secs(1));
        assert_eq!(backoff.next_interval(0), Duration::from_secs(1));
        assert_eq!(backoff.next_interval(10), Duration::from_secs(1));
    }

    #[test]
    fn exponential_backoff_grows() {
        let backoff = ExponentialBackoff::new(Duration::from_secs(1));
        assert_eq!(backoff.next_interval(0), Duration::from_secs(1));
        assert_eq!(backoff.next_interval(1), Duration::from_secs(2));
        assert_eq!(backoff.next_interval(2), Duration::from_secs(4));
    }

    #[test]
    fn exponential_backoff_respects_max() {
        let backoff =
            ExponentialBackoff::new(Duration::from_secs(1)).max_interval(Duration::from_secs(4));
        assert_eq!(backoff.next_interval(5), Duration::from_secs(4));
    }

    #[test]
    fn connection_manager_recovery_schedule() {
        // 1s, 2s, 4s capped at three attempts (attempt indices 0,1,2).
        let backoff = ExponentialBackoff::new(Duration::from_secs(1));
        assert_eq!(backoff.next_interval(0), Duration::from_secs(1));
        assert_eq!(backoff.next_interval(1), Duration::from_secs(2));
        assert_eq!(backoff.next_interval(2), Duration::from_secs(4));
    }

    #[test]
    fn exponential_random_backoff_has_variance_and_bounds() {
        let backoff = ExponentialRandomBackoff::new(Duration::from_millis(100), 0.5);
        let intervals: Vec<_> = (0..10).map(|_| backoff.next_interval(1)).collect();
        let all_same = intervals.windows(2).all(|w| w[0] == w[1]);
        assert!(!all_same);
        for interval in intervals {
            assert!(interval >= Duration::from_millis(100) && interval <= Duration::from_millis(300));
        }
    }

    #[test]
    fn fn_interval_uses_custom_function() {
        let backoff = FnInterval::new(|attempt| Duration::from_secs((attempt + 1) as u64));
        assert_eq!(backoff.next_interval(2), Duration::from_secs(3));
    }
}
