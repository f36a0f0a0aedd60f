//! Connection-manager metrics snapshot.
//!
//! Mirrors the fields surfaced by a `get_metrics()` call: attempt
//! and failure counters, the last error seen, and health-check/recovery
//! counters, plus `is_connected` for a quick liveness read.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A point-in-time snapshot of the connection manager's health counters.
#[derive(Debug, Clone)]
pub struct ConnectionMetrics {
    /// Total number of connection attempts since startup.
    pub connection_attempts: u64,
    /// Total number of connection attempts that failed.
    pub connection_failures: u64,
    /// Total number of health checks run.
    pub health_checks: u64,
    /// Total number of recovery attempts (client rebuilds) triggered.
    pub recovery_attempts: u64,
    /// Total number of recovery attempts that succeeded.
    pub successful_recoveries: u64,
    /// Current consecutive connection-error streak.
    pub current_error_streak: u32,
    /// Whether the manager currently believes it is connected.
    pub is_connected: bool,
    /// The most recent error message, if any.
    pub last_error: Option<String>,
    /// Time since the last successful health check, if one has run.
    pub time_since_last_health_check: Option<Duration>,
}

/// Shared, lock-light counters updated by the manager and its background
/// tasks, and read out via [`ConnectionMetricsRegistry::snapshot`].
#[derive(Clone, Default)]
pub struct ConnectionMetricsRegistry {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    connection_attempts: AtomicU64,
    connection_failures: AtomicU64,
    health_checks: AtomicU64,
    recovery_attempts: AtomicU64,
    successful_recoveries: AtomicU64,
    current_error_streak: AtomicU64,
    is_connected: AtomicBool,
    last_error: Mutex<Option<String>>,
    last_health_check: Mutex<Option<Instant>>,
}

impl ConnectionMetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.inner
            .connection_attempts
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, error: impl Into<String>) {
        self.inner
            .connection_failures
            .fetch_add(1, Ordering::Relaxed);
        self.inner
            .current_error_streak
            .fetch_add(1, Ordering::Relaxed);
        self.inner.is_connected.store(false, Ordering::Relaxed);
        *self.inner.last_error.lock().unwrap() = Some(error.into());
    }

    pub fn record_success(&self) {
        self.inner.current_error_streak.store(0, Ordering::Relaxed);
        self.inner.is_connected.store(true, Ordering::Relaxed);
    }

    pub fn record_health_check(&self) {
        self.inner.health_checks.fetch_add(1, Ordering::Relaxed);
        *self.inner.last_health_check.lock().unwrap() = Some(Instant::now());
    }

    pub fn record_recovery_attempt(&self) {
        self.inner.recovery_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recovery_success(&self) {
        self.inner
            .successful_recoveries
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn error_streak(&self) -> u32 {
        self.inner.current_error_streak.load(Ordering::Relaxed) as u32
    }

    pub fn is_connected(&self) -> bool {
        self.inner.is_connected.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ConnectionMetrics {
        ConnectionMetrics {
            connection_attempts: self.inner.connection_attempts.load(Ordering::Relaxed),
            connection_failures: self.inner.connection_failures.load(Ordering::Relaxed),
            health_checks: self.inner.health_checks.load(Ordering::Relaxed),
            recovery_attempts: self.inner.recovery_attempts.load(Ordering::Relaxed),
            successful_recoveries: self.inner.successful_recoveries.load(Ordering::Relaxed),
            current_error_streak: self.inner.current_error_streak.load(Ordering::Relaxed) as u32,
            is_connected: self.inner.is_connected.load(Ordering::Relaxed),
            last_error: self.inner.last_error.lock().unwrap().clone(),
            time_since_last_health_check: self
                .inner
                .last_health_check
                .lock()
                .unwrap()
                .map(|t| t.elapsed()),
        }
    }
}
