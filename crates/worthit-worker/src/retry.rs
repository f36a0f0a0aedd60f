//! Bounded retry for ad-hoc external calls (scrape, sentiment, notify),
//! built directly on [`worthit_core::ExponentialBackoff`] rather than the
//! Tower `Service`/`Layer` wrapper in `worthit-retry`: these calls are
//! one-off async closures, not steps in a request pipeline.

use crate::config::RetryConfig;
use std::future::Future;
use worthit_core::{CoreError, IntervalFunction};

/// Retries `call` up to `config.max_attempts` times while `CoreError::is_retryable`
/// holds, sleeping `config.backoff()`'s interval between attempts. `on_retry`
/// is invoked before each sleep, receiving the 0-indexed attempt that just
/// failed.
pub async fn retry_transient<F, Fut, T>(
    config: &RetryConfig,
    mut call: F,
    mut on_retry: impl FnMut(usize),
) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let backoff = config.backoff();
    let mut attempt = 0;

    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 < config.max_attempts && err.is_retryable() => {
                on_retry(attempt);
                tokio::time::sleep(backoff.next_interval(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(2),
        }
    }

    #[tokio::test]
    async fn succeeds_without_retry_on_first_try() {
        let calls = AtomicUsize::new(0);
        let result = retry_transient(
            &fast_config(),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<u32, CoreError>(42) }
            },
            |_| {},
        )
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_failures_up_to_the_attempt_budget() {
        let calls = AtomicUsize::new(0);
        let retries_seen = AtomicUsize::new(0);
        let result = retry_transient(
            &fast_config(),
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(CoreError::UpstreamTransient {
                            service: "scraper".into(),
                            message: "timeout".into(),
                        })
                    } else {
                        Ok::<u32, CoreError>(7)
                    }
                }
            },
            |_| {
                retries_seen.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(retries_seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_failures() {
        let calls = AtomicUsize::new(0);
        let result = retry_transient(
            &fast_config(),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<u32, CoreError>(CoreError::UpstreamPermanent {
                        service: "scraper".into(),
                        message: "401".into(),
                    })
                }
            },
            |_| {},
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicUsize::new(0);
        let result = retry_transient(
            &fast_config(),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<u32, CoreError>(CoreError::UpstreamTransient {
                        service: "scraper".into(),
                        message: "timeout".into(),
                    })
                }
            },
            |_| {},
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
