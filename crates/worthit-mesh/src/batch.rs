//! Request batching: concurrent callers for the same batch key share one
//! upstream call, flushed on whichever trigger fires first — batch size or
//! batch timeout.

use crate::config::BatchConfig;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Notify};

struct PendingBatch<R> {
    joined: Arc<AtomicUsize>,
    ready: Arc<Notify>,
    result: broadcast::Sender<Result<R, String>>,
}

pub struct BatchQueue<R> {
    pending: Mutex<HashMap<String, Arc<PendingBatch<R>>>>,
}

impl<R: Clone + Send + Sync + 'static> Default for BatchQueue<R> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }
}

impl<R: Clone + Send + Sync + 'static> BatchQueue<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the batch for `batch_key`. The first joiner becomes the leader:
    /// it waits for `batch_size` joiners or `batch_timeout`, then runs
    /// `flush` once and fans the result out to every joiner, including
    /// itself. Returns the batch size the leader observed when it flushed.
    pub async fn join<F, Fut>(
        &self,
        batch_key: &str,
        config: &BatchConfig,
        flush: F,
    ) -> (Result<R, String>, usize)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, String>>,
    {
        let (batch, is_leader, joined_at) = {
            let mut pending = self.pending.lock();
            if let Some(existing) = pending.get(batch_key) {
                let joined_at = existing.joined.fetch_add(1, Ordering::SeqCst) + 1;
                if joined_at >= config.batch_size {
                    existing.ready.notify_one();
                }
                (Arc::clone(existing), false, joined_at)
            } else {
                let (tx, _rx) = broadcast::channel(1);
                let batch = Arc::new(PendingBatch {
                    joined: Arc::new(AtomicUsize::new(1)),
                    ready: Arc::new(Notify::new()),
                    result: tx,
                });
                pending.insert(batch_key.to_string(), Arc::clone(&batch));
                (batch, true, 1)
            }
        };

        if !is_leader {
            let mut receiver = batch.result.subscribe();
            let result = receiver
                .recv()
                .await
                .unwrap_or_else(|_| Err("batch leader dropped before flushing".to_string()));
            return (result, joined_at);
        }

        if config.batch_size > 1 {
            tokio::select! {
                _ = batch.ready.notified() => {}
                _ = tokio::time::sleep(config.batch_timeout) => {}
            }
        }

        self.pending.lock().remove(batch_key);
        let size = batch.joined.load(Ordering::SeqCst);
        let result = flush().await;
        let _ = batch.result.send(result.clone());
        (result, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize as Counter;
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_joiners_share_one_flush() {
        let queue: Arc<BatchQueue<u32>> = Arc::new(BatchQueue::new());
        let flush_count = Arc::new(Counter::new(0));
        let config = Arc::new(BatchConfig {
            batch_size: 10,
            batch_timeout: Duration::from_millis(50),
        });

        let mut handles = Vec::new();
        for _ in 0..3 {
            let queue = Arc::clone(&queue);
            let flush_count = Arc::clone(&flush_count);
            let config = Arc::clone(&config);
            handles.push(tokio::spawn(async move {
                queue
                    .join("batch-key", &config, || async {
                        flush_count.fetch_add(1, Ordering::SeqCst);
                        Ok::<u32, String>(42)
                    })
                    .await
            }));
        }

        for handle in handles {
            let (result, _) = handle.await.unwrap();
            assert_eq!(result.unwrap(), 42);
        }
        assert_eq!(flush_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reaching_batch_size_flushes_before_timeout() {
        let queue: Arc<BatchQueue<u32>> = Arc::new(BatchQueue::new());
        let config = Arc::new(BatchConfig {
            batch_size: 2,
            batch_timeout: Duration::from_secs(10),
        });

        let queue2 = Arc::clone(&queue);
        let config2 = Arc::clone(&config);
        let leader = tokio::spawn(async move {
            let started = std::time::Instant::now();
            let (result, size) = queue2
                .join("k", &config2, || async { Ok::<u32, String>(1) })
                .await;
            (result, size, started.elapsed())
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.join("k", &config, || async { Ok::<u32, String>(1) }).await;

        let (result, size, elapsed) = leader.await.unwrap();
        assert_eq!(result.unwrap(), 1);
        assert_eq!(size, 2);
        assert!(elapsed < Duration::from_secs(1));
    }
}
