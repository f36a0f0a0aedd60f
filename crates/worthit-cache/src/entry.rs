//! Cache entry shape and adaptive TTL calculation.

use std::time::{Duration, Instant};

/// A cached response body plus bookkeeping for TTL and eviction.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub body: Vec<u8>,
    pub content_type: String,
    pub inserted_at: Instant,
    pub ttl: Duration,
    pub hit_count: u64,
    pub size: usize,
}

impl CacheEntry {
    pub fn new(body: Vec<u8>, content_type: impl Into<String>, ttl: Duration) -> Self {
        let size = body.len();
        Self {
            body,
            content_type: content_type.into(),
            inserted_at: Instant::now(),
            ttl,
            hit_count: 0,
            size,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// `base * (1 + hit_count / 10)`, capped at `max`: every ten hits extends
/// the TTL by one base interval, up to the ceiling.
pub fn adaptive_ttl(base: Duration, max: Duration, hit_count: u64) -> Duration {
    let scaled = base.saturating_mul(1 + (hit_count / 10) as u32);
    scaled.min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_grows_every_ten_hits_and_caps_at_max() {
        let base = Duration::from_secs(300);
        let max = Duration::from_secs(3600);
        assert_eq!(adaptive_ttl(base, max, 0), Duration::from_secs(300));
        assert_eq!(adaptive_ttl(base, max, 9), Duration::from_secs(300));
        assert_eq!(adaptive_ttl(base, max, 10), Duration::from_secs(600));
        assert_eq!(adaptive_ttl(base, max, 100), max);
    }
}
