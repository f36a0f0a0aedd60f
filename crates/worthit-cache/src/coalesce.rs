//! Singleflight dedup for concurrent cache misses.
//!
//! Same shape as `worthit_coalesce`'s `InFlight`: the first miss for a
//! fingerprint becomes the leader and fetches upstream; latecomers subscribe
//! to its broadcast result instead of issuing their own fetch.

use crate::error::CacheError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

type Shared<V> = Result<Arc<V>, CacheError>;

/// Singleflight dedup, generic over the cached value type.
pub struct MissCoalescer<V> {
    in_flight: Mutex<HashMap<String, broadcast::Sender<Shared<V>>>>,
}

impl<V> Default for MissCoalescer<V> {
    fn default() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> MissCoalescer<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fetch` for `key`, coalescing concurrent callers for the same
    /// key behind a single invocation.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Shared<V>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, CacheError>>,
    {
        let mut receiver = {
            let mut guard = self.in_flight.lock();
            if let Some(sender) = guard.get(key) {
                Some(sender.subscribe())
            } else {
                let (tx, _rx) = broadcast::channel(1);
                guard.insert(key.to_string(), tx);
                None
            }
        };

        if let Some(receiver) = receiver.take() {
            return self.wait_for_leader(receiver).await;
        }

        let result = fetch().await.map(Arc::new);

        let mut guard = self.in_flight.lock();
        if let Some(sender) = guard.remove(key) {
            let _ = sender.send(result.clone());
        }
        result
    }

    async fn wait_for_leader(&self, mut receiver: broadcast::Receiver<Shared<V>>) -> Shared<V> {
        match receiver.recv().await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Upstream(
                "leader request was cancelled before completing".into(),
            )),
        }
    }
}
