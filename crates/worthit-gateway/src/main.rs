//! Gateway binary entry point. Exit codes: 0 clean shutdown, 1
//! configuration error, 2 unrecoverable dependency failure on startup.

use std::process::ExitCode;
use std::sync::Arc;
use worthit_connection::{ConnectionManager, ManagerConfig};
use worthit_gateway::{app, AppState, GatewayConfig};
use worthit_queue::{QueueConfig, TaskQueue};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "configuration error");
            return ExitCode::from(1);
        }
    };

    let connection = match ConnectionManager::connect(&config.redis_url, config.redis_ssl, ManagerConfig::default()) {
        Ok(connection) => connection,
        Err(err) => {
            tracing::error!(%err, "failed to build store connection");
            return ExitCode::from(2);
        }
    };
    connection.start().await;

    if let Err(err) = connection.health_check().await {
        tracing::error!(%err, "store is unreachable at startup");
        return ExitCode::from(2);
    }

    let queue = Arc::new(TaskQueue::new(Arc::clone(&connection), QueueConfig::default()));
    let state = AppState {
        queue,
        config: Arc::new(config.clone()),
    };

    let listener = match tokio::net::TcpListener::bind(&config.api_host).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%err, host = %config.api_host, "failed to bind listener");
            return ExitCode::from(2);
        }
    };

    tracing::info!(host = %config.api_host, "gateway listening");

    let shutdown_connection = Arc::clone(&connection);
    let server = axum::serve(listener, app(state)).with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
        shutdown_connection.shutdown().await;
    });

    if let Err(err) = server.await {
        tracing::error!(%err, "server error");
        return ExitCode::from(2);
    }

    ExitCode::from(0)
}
