//! Shared application state handed to every axum handler.

use crate::config::GatewayConfig;
use std::sync::Arc;
use worthit_queue::TaskQueue;

#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<TaskQueue>,
    pub config: Arc<GatewayConfig>,
}
