use std::sync::Arc;
use tower::layer::Layer;

use crate::{config::ReconnectConfig, service::ReconnectService, state::ReconnectState};

/// A Tower Layer that adds automatic reconnection capabilities to a service.
///
/// This layer wraps services that implement `MakeService`, allowing them to
/// automatically reconnect on connection failures with configurable backoff strategies.
///
/// # Examples
///
/// ```
/// use worthit_connection::{ReconnectLayer, ReconnectConfig};
///
/// let layer = ReconnectLayer::new(ReconnectConfig::default());
/// ```
#[derive(Clone, Debug)]
pub struct ReconnectLayer {
    config: Arc<ReconnectConfig>,
    state: ReconnectState,
}

impl ReconnectLayer {
    /// Creates a new `ReconnectLayer` with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use worthit_connection::{ReconnectLayer, ReconnectConfig};
    ///
    /// let config = ReconnectConfig::builder()
    ///     .max_attempts(5)
    ///     .build();
    ///
    /// let layer = ReconnectLayer::new(config);
    /// ```
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: ReconnectState::new(),
        }
    }

    /// Creates a new `ReconnectLayer` with default configuration.
    ///
    /// Uses exponential backoff from 100ms to 5 seconds with unlimited attempts.
    ///
    /// # Examples
    ///
    /// ```
    /// use worthit_connection::ReconnectLayer;
    ///
    /// let layer = ReconnectLayer::default();
    /// ```
    pub fn with_defaults() -> Self {
        Self::new(ReconnectConfig::default())
    }

    /// Returns a reference to the reconnection state.
    ///
    /// This can be used to monitor the current connection state and statistics.
    pub fn state(&self) -> &ReconnectState {
        &self.state
    }
}

impl Default for ReconnectLayer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<S> Layer<S> for ReconnectLayer {
    type Service = ReconnectService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ReconnectService::new(inner, self.config.clone(), self.state.clone())
    }
}
