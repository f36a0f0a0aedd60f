//! Tunables for [`crate::Worker`].

use std::time::Duration;
use worthit_core::ExponentialBackoff;

/// Configuration for the worker's per-call retry policy: up to
/// `max_attempts` tries per external call, exponential backoff bounded to
/// `[initial_interval, max_interval]`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.initial_interval).max_interval(self.max_interval)
    }
}

/// Top-level worker configuration.
#[derive(Debug, Clone, Default)]
pub struct WorkerConfig {
    pub retry: RetryConfig,
}
