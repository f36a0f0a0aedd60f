//! Warm-up analyzer: flags frequently-missed paths for proactive refresh.
//!
//! Tracks a running hit/miss count per path. Once a path has accumulated
//! enough samples and its miss ratio crosses the configured threshold
//! (default: 10 samples, 30% miss ratio), it's surfaced once via
//! `paths_to_warm` and recorded in `warmed_paths` so it isn't repeatedly
//! re-scheduled until the window elapses.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Copy)]
struct PathStats {
    hits: u64,
    misses: u64,
}

impl PathStats {
    fn samples(&self) -> u64 {
        self.hits + self.misses
    }

    fn miss_ratio(&self) -> f64 {
        if self.samples() == 0 {
            0.0
        } else {
            self.misses as f64 / self.samples() as f64
        }
    }
}

pub struct WarmupAnalyzer {
    stats: HashMap<String, PathStats>,
    warmed_paths: HashMap<String, Instant>,
    min_samples: u64,
    miss_ratio_threshold: f64,
    window: Duration,
}

impl WarmupAnalyzer {
    pub fn new(min_samples: u64, miss_ratio_threshold: f64, window: Duration) -> Self {
        Self {
            stats: HashMap::new(),
            warmed_paths: HashMap::new(),
            min_samples,
            miss_ratio_threshold,
            window,
        }
    }

    pub fn record_hit(&mut self, path: &str) {
        self.stats.entry(path.to_string()).or_default().hits += 1;
    }

    pub fn record_miss(&mut self, path: &str) {
        self.stats.entry(path.to_string()).or_default().misses += 1;
    }

    /// Returns paths that should be warmed now, marking each as warmed so it
    /// isn't returned again until `window` has elapsed.
    pub fn paths_to_warm(&mut self) -> Vec<String> {
        let mut due = Vec::new();
        for (path, stats) in &self.stats {
            if stats.samples() < self.min_samples || stats.miss_ratio() <= self.miss_ratio_threshold {
                continue;
            }
            let already_warmed = self
                .warmed_paths
                .get(path)
                .is_some_and(|at| at.elapsed() < self.window);
            if !already_warmed {
                due.push(path.clone());
            }
        }

        for path in &due {
            self.warmed_paths.insert(path.clone(), Instant::now());
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_below_sample_floor_is_not_scheduled() {
        let mut analyzer = WarmupAnalyzer::new(10, 0.3, Duration::from_secs(600));
        for _ in 0..5 {
            analyzer.record_miss("/api/products/1");
        }
        assert!(analyzer.paths_to_warm().is_empty());
    }

    #[test]
    fn high_miss_ratio_past_floor_schedules_once() {
        let mut analyzer = WarmupAnalyzer::new(10, 0.3, Duration::from_secs(600));
        for _ in 0..8 {
            analyzer.record_miss("/api/products/1");
        }
        for _ in 0..2 {
            analyzer.record_hit("/api/products/1");
        }

        let due = analyzer.paths_to_warm();
        assert_eq!(due, vec!["/api/products/1".to_string()]);
        assert!(analyzer.paths_to_warm().is_empty());
    }

    #[test]
    fn low_miss_ratio_is_never_scheduled() {
        let mut analyzer = WarmupAnalyzer::new(10, 0.3, Duration::from_secs(600));
        for _ in 0..9 {
            analyzer.record_hit("/api/products/1");
        }
        analyzer.record_miss("/api/products/1");
        assert!(analyzer.paths_to_warm().is_empty());
    }
}
