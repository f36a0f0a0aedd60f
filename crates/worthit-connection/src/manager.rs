//! Concrete connection manager for the shared key/value store.
//!
//! A pooled
//! client is lazily built, a background task pings it on an interval, three
//! consecutive health-check failures trigger a rebuild with exponential
//! backoff (1s, 2s, 4s, capped at three attempts), and a second background
//! task periodically recycles the pool. Unlike the generic
//! [`crate::ReconnectLayer`] (a Tower middleware for arbitrary services),
//! this type owns one specific resource end-to-end: construction, health,
//! recovery and shutdown.

use crate::metrics::{ConnectionMetrics, ConnectionMetricsRegistry};
use redis::aio::MultiplexedConnection;
use redis::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use worthit_core::backoff::{ExponentialBackoff, IntervalFunction};
use worthit_core::error::CoreError;

/// Tunables for [`ConnectionManager`], with conservative production
/// defaults.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Interval between background health-check pings.
    pub health_check_interval: Duration,
    /// Interval between background pool-recycling passes.
    pub cleanup_interval: Duration,
    /// Consecutive health-check failures before recovery is triggered.
    pub failure_threshold: u32,
    /// Maximum number of recovery attempts per incident.
    pub max_recovery_attempts: usize,
    /// Per-command timeout.
    pub command_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            health_check_interval: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(300),
            failure_threshold: 3,
            max_recovery_attempts: 3,
            command_timeout: Duration::from_secs(15),
        }
    }
}

struct Background {
    health_check: JoinHandle<()>,
    cleanup: JoinHandle<()>,
}

/// Owns the single pooled connection to the shared store.
///
/// Construct with [`ConnectionManager::connect`], which detects whether the
/// URL needs an SSL upgrade (an explicit `redis://` scheme is upgraded to
/// `rediss://` when the environment requires TLS; the two are never combined
/// with an explicit `ssl` option).
pub struct ConnectionManager {
    client: Client,
    config: ManagerConfig,
    connection: RwLock<Option<MultiplexedConnection>>,
    recovery_lock: Mutex<()>,
    metrics: ConnectionMetricsRegistry,
    background: Mutex<Option<Background>>,
}

impl ConnectionManager {
    /// Builds the client from `redis_url`, upgrading the scheme to `rediss://`
    /// when `require_tls` is set and the URL isn't already using it.
    pub fn connect(
        redis_url: &str,
        require_tls: bool,
        config: ManagerConfig,
    ) -> Result<Arc<Self>, CoreError> {
        let url = upgrade_scheme(redis_url, require_tls);
        let client = Client::open(url).map_err(|e| CoreError::Config {
            message: format!("invalid redis url: {e}"),
        })?;

        Ok(Arc::new(Self {
            client,
            config,
            connection: RwLock::new(None),
            recovery_lock: Mutex::new(()),
            metrics: ConnectionMetricsRegistry::new(),
            background: Mutex::new(None),
        }))
    }

    /// Starts the background health-check and cleanup tasks. Idempotent:
    /// calling twice has no effect beyond the first call.
    pub async fn start(self: &Arc<Self>) {
        let mut guard = self.background.lock().await;
        if guard.is_some() {
            return;
        }

        let health_manager = Arc::clone(self);
        let health_check = tokio::spawn(async move {
            health_manager.health_check_loop().await;
        });

        let cleanup_manager = Arc::clone(self);
        let cleanup = tokio::spawn(async move {
            cleanup_manager.cleanup_loop().await;
        });

        *guard = Some(Background {
            health_check,
            cleanup,
        });
    }

    /// Returns a ready connection, building one on first use and rebuilding
    /// it if the cached connection was torn down by a prior failure.
    pub async fn get_client(self: &Arc<Self>) -> Result<MultiplexedConnection, CoreError> {
        if let Some(conn) = self.connection.read().await.clone() {
            return Ok(conn);
        }
        self.initialize_client().await
    }

    /// Releases a connection back to the manager. The multiplexed
    /// connection is cheaply `Clone`, so this is a no-op beyond bookkeeping
    /// parity with an explicit release step on drop.
    pub fn release_connection(&self, _conn: MultiplexedConnection) {}

    /// Returns a metrics snapshot safe to read without contending with the
    /// background tasks.
    pub fn get_metrics(&self) -> ConnectionMetrics {
        self.metrics.snapshot()
    }

    /// Runs a single health check immediately, returning its outcome.
    pub async fn health_check(self: &Arc<Self>) -> Result<(), CoreError> {
        self.metrics.record_health_check();
        let mut conn = self.get_client().await?;
        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => {
                self.metrics.record_success();
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                self.metrics.record_failure(reason.clone());
                Err(CoreError::ConnectionUnavailable { reason })
            }
        }
    }

    /// Cancels background tasks and drops the cached connection. Safe to
    /// call once; a second call is a no-op.
    pub async fn shutdown(self: &Arc<Self>) {
        if let Some(bg) = self.background.lock().await.take() {
            bg.health_check.abort();
            bg.cleanup.abort();
        }
        *self.connection.write().await = None;
    }

    async fn initialize_client(self: &Arc<Self>) -> Result<MultiplexedConnection, CoreError> {
        self.metrics.record_attempt();
        match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => {
                self.metrics.record_success();
                *self.connection.write().await = Some(conn.clone());
                Ok(conn)
            }
            Err(e) => {
                self.metrics.record_failure(e.to_string());
                Err(CoreError::ConnectionUnavailable {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn health_check_loop(self: Arc<Self>) {
        let interval = self.config.health_check_interval;
        loop {
            tokio::time::sleep(interval).await;
            if self.health_check().await.is_err()
                && self.metrics.error_streak() >= self.config.failure_threshold
            {
                self.initiate_recovery().await;
            }
        }
    }

    async fn cleanup_loop(self: Arc<Self>) {
        let interval = self.config.cleanup_interval;
        loop {
            tokio::time::sleep(interval).await;
            self.cleanup_stale_connections().await;
        }
    }

    /// Rebuilds the client with exponential backoff: 1s, 2s, 4s, capped at
    /// `max_recovery_attempts`.
    async fn initiate_recovery(self: &Arc<Self>) {
        let _guard = self.recovery_lock.lock().await;
        self.metrics.record_recovery_attempt();
        *self.connection.write().await = None;

        let backoff = ExponentialBackoff::new(Duration::from_secs(1));
        for attempt in 0..self.config.max_recovery_attempts {
            tokio::time::sleep(backoff.next_interval(attempt)).await;
            if self.initialize_client().await.is_ok() {
                self.metrics.record_recovery_success();
                return;
            }
        }
    }

    async fn cleanup_stale_connections(self: &Arc<Self>) {
        if !self.metrics.is_connected() {
            *self.connection.write().await = None;
        }
    }
}

fn upgrade_scheme(redis_url: &str, require_tls: bool) -> String {
    if require_tls && redis_url.starts_with("redis://") {
        redis_url.replacen("redis://", "rediss://", 1)
    } else {
        redis_url.to_string()
    }
}
