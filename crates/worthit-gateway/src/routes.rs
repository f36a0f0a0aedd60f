//! Router assembly: routes, body-size limit, tracing.

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tower_http::timeout::TimeoutLayer;

/// 1 MiB: payloads larger than this are rejected with 413 before
/// the body is ever handed to a handler.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/webhook", post(handlers::webhook))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;
    use worthit_connection::{ConnectionManager, ManagerConfig};
    use worthit_queue::{QueueConfig, TaskQueue};

    fn test_state() -> AppState {
        let connection = ConnectionManager::connect("redis://127.0.0.1:6379", false, ManagerConfig::default())
            .expect("client construction does not touch the network");
        let queue = Arc::new(TaskQueue::new(connection, QueueConfig::default()));
        AppState {
            queue,
            config: Arc::new(crate::config::GatewayConfig {
                redis_url: "redis://localhost".into(),
                redis_ssl: false,
                api_host: "0.0.0.0:8080".into(),
                telegram_token: "t".into(),
                apify_token: "a".into(),
                hf_token: "h".into(),
                allowed_origin: "*".into(),
            }),
        }
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_with_413() {
        let app = app(test_state());
        let body = vec![b'a'; MAX_BODY_BYTES + 1];
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn non_json_content_type_is_rejected_with_415() {
        let app = app(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "text/plain")
            .body(Body::from("not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
