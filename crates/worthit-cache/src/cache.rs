//! The response cache facade: fingerprinting, coalescing, compression,
//! adaptive TTL and byte-budget eviction tied together behind one API.

use crate::coalesce::MissCoalescer;
use crate::compression;
use crate::config::CacheConfig;
use crate::entry::{adaptive_ttl, CacheEntry};
use crate::error::CacheError;
use crate::events::CacheEvent;
use crate::fingerprint::fingerprint;
use crate::store::ByteBudgetStore;
use crate::warmup::WarmupAnalyzer;
use parking_lot::Mutex;
use std::future::Future;
use std::time::Instant;
use worthit_core::events::{EventListener, EventListeners};

/// A cacheable response body plus its content type.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Outcome of a [`ResponseCache::get_or_fetch`] call, distinguishing a
/// cache hit from a freshly-fetched response for metrics/logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Upstream,
}

pub struct ResponseCache {
    config: CacheConfig,
    store: Mutex<ByteBudgetStore>,
    warmup: Mutex<WarmupAnalyzer>,
    coalescer: MissCoalescer<CachedResponse>,
    events: EventListeners<CacheEvent>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        let warmup = WarmupAnalyzer::new(
            config.warmup_min_samples,
            config.warmup_miss_ratio,
            config.warmup_window,
        );
        let store = ByteBudgetStore::new(config.byte_budget, config.eviction_fraction);
        Self {
            config,
            store: Mutex::new(store),
            warmup: Mutex::new(warmup),
            coalescer: MissCoalescer::new(),
            events: EventListeners::new(),
        }
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: EventListener<CacheEvent> + 'static,
    {
        self.events.add(listener);
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns paths the warm-up analyzer thinks deserve a proactive refresh
    /// right now, marking them as scheduled.
    pub fn paths_to_warm(&self) -> Vec<String> {
        self.warmup.lock().paths_to_warm()
    }

    /// Looks up a response by path and (already-decoded) query pairs,
    /// fetching from `fetch` and storing the result on a miss. Concurrent
    /// misses for the same fingerprint share one `fetch` invocation.
    pub async fn get_or_fetch<'a, F, Fut>(
        &self,
        path: &str,
        query_pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
        fetch: F,
    ) -> Result<(CachedResponse, Source), CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedResponse, CacheError>>,
    {
        let key = fingerprint(path, query_pairs);

        if let Some(hit) = self.read_hit(&key) {
            self.warmup.lock().record_hit(path);
            self.events.emit(&CacheEvent::Hit {
                timestamp: Instant::now(),
                fingerprint: key,
            });
            return Ok((hit, Source::Cache));
        }

        self.warmup.lock().record_miss(path);
        self.events.emit(&CacheEvent::Miss {
            timestamp: Instant::now(),
            fingerprint: key.clone(),
        });

        let response = self
            .coalescer
            .get_or_fetch(&key, fetch)
            .await
            .map(|arc| (*arc).clone())?;

        let evicted = self.write_entry(&key, &response);
        if evicted > 0 {
            self.events.emit(&CacheEvent::Eviction {
                timestamp: Instant::now(),
                evicted,
            });
        }

        Ok((response, Source::Upstream))
    }

    fn read_hit(&self, key: &str) -> Option<CachedResponse> {
        let mut store = self.store.lock();
        let entry = store.get_mut(key)?;
        if entry.is_expired() {
            store.remove(key);
            return None;
        }

        entry.hit_count += 1;
        let hit_count = entry.hit_count;
        let content_type = entry.content_type.clone();
        let stored_body = entry.body.clone();
        entry.ttl = adaptive_ttl(self.config.base_ttl, self.config.max_ttl, hit_count);

        let body = compression::decode(&stored_body).ok()?;
        Some(CachedResponse { body, content_type })
    }

    fn write_entry(&self, key: &str, response: &CachedResponse) -> usize {
        let stored_body = compression::encode(&response.body);
        let entry = CacheEntry::new(stored_body, response.content_type.clone(), self.config.base_ttl);
        self.store.lock().insert(key.to_string(), entry)
    }
}
