//! Tunables for [`crate::TaskQueue`].

use std::time::Duration;

/// Configuration for the task queue, with production-sized defaults.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// How long a blocking dequeue waits before returning the timeout sentinel.
    pub dequeue_timeout: Duration,
    /// Every Nth dequeue must come from `normal` if it is non-empty, even
    /// when `high` has pending work. Prevents starvation of the low-priority
    /// class under sustained high-priority load.
    pub anti_starvation_ratio: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            dequeue_timeout: Duration::from_secs(5),
            anti_starvation_ratio: 4,
        }
    }
}
