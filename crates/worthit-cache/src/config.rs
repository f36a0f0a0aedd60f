//! Tunables for [`crate::ResponseCache`], with production-sized defaults.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Total tracked byte size before eviction kicks in. Default 100 MB.
    pub byte_budget: usize,
    /// Fraction of entries removed (by recency/frequency) on eviction.
    pub eviction_fraction: f64,
    /// Starting TTL for a fresh entry.
    pub base_ttl: Duration,
    /// Ceiling a hot entry's adaptive TTL can grow to.
    pub max_ttl: Duration,
    /// Body size above which compression is attempted.
    pub compression_threshold: usize,
    /// Minimum samples on a path before the warm-up analyzer considers it.
    pub warmup_min_samples: u64,
    /// Miss ratio above which a path is scheduled for warm-up.
    pub warmup_miss_ratio: f64,
    /// Window a path stays in `warmed_paths` before it's eligible again.
    pub warmup_window: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            byte_budget: 100 * 1024 * 1024,
            eviction_fraction: 0.2,
            base_ttl: Duration::from_secs(300),
            max_ttl: Duration::from_secs(3600),
            compression_threshold: crate::compression::SIZE_THRESHOLD,
            warmup_min_samples: 10,
            warmup_miss_ratio: 0.3,
            warmup_window: Duration::from_secs(600),
        }
    }
}
