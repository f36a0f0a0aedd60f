use std::sync::Arc;
use std::time::Duration;
use worthit_core::backoff::IntervalFunction;

/// A predicate deciding whether a given error should be retried.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Combines a backoff strategy with an optional retry predicate.
///
/// By default every error is retried (up to `max_attempts`); set
/// [`RetryPolicy::retry_predicate`] to narrow that to specific error kinds,
/// e.g. only `CoreError::is_retryable()` ones.
pub struct RetryPolicy<E> {
    interval_fn: Arc<dyn IntervalFunction>,
    pub(crate) retry_predicate: Option<RetryPredicate<E>>,
}

impl<E> RetryPolicy<E> {
    /// Creates a policy that retries every error with the given backoff.
    pub fn new(interval_fn: Arc<dyn IntervalFunction>) -> Self {
        Self {
            interval_fn,
            retry_predicate: None,
        }
    }

    /// Returns `true` if `error` should be retried.
    pub fn should_retry(&self, error: &E) -> bool {
        match &self.retry_predicate {
            Some(predicate) => predicate(error),
            None => true,
        }
    }

    /// Returns the delay before the next attempt, given the 0-indexed retry
    /// attempt number.
    pub fn next_backoff(&self, attempt: usize) -> Duration {
        self.interval_fn.next_interval(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worthit_core::backoff::FixedInterval;

    #[test]
    fn default_policy_retries_everything() {
        let policy: RetryPolicy<&str> = RetryPolicy::new(Arc::new(FixedInterval::new(
            Duration::from_millis(10),
        )));
        assert!(policy.should_retry(&"anything"));
        assert_eq!(policy.next_backoff(0), Duration::from_millis(10));
    }

    #[test]
    fn predicate_filters_errors() {
        let mut policy: RetryPolicy<&str> = RetryPolicy::new(Arc::new(FixedInterval::new(
            Duration::from_millis(10),
        )));
        policy.retry_predicate = Some(Arc::new(|e: &&str| *e == "transient"));
        assert!(policy.should_retry(&"transient"));
        assert!(!policy.should_retry(&"permanent"));
    }
}
