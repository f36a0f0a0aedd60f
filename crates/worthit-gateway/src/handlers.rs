//! Route handlers for the four canonical endpoints.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use worthit_core::CoreError;
use worthit_queue::{Priority, Task};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub task_id: String,
}

/// `POST /analyze`: validates the URL and enqueues a `product_analysis`
/// task. Always returns `processing` — the worker owns completion.
pub async fn analyze(State(state): State<AppState>, Json(request): Json<AnalyzeRequest>) -> Result<Json<AnalyzeResponse>, ApiError> {
    if request.url.trim().is_empty() || !(request.url.starts_with("http://") || request.url.starts_with("https://")) {
        return Err(CoreError::Validation {
            message: "url must be a non-empty http(s) URL".to_string(),
        }
        .into());
    }

    let task = Task::new("product_analysis", json!({ "url": request.url }), Priority::Normal);
    let task_id = state
        .queue
        .enqueue(task)
        .await
        .map_err(CoreError::from)?;

    Ok(Json(AnalyzeResponse {
        status: "processing",
        task_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    #[serde(flatten)]
    pub update: serde_json::Value,
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
}

/// `POST /webhook`: enqueues a `telegram_update` task carrying the raw
/// update body, high priority so interactive replies stay snappy.
pub async fn webhook(State(state): State<AppState>, Json(request): Json<WebhookRequest>) -> Result<Json<WebhookResponse>, ApiError> {
    let mut task = Task::new("telegram_update", request.update, Priority::High);
    task.chat_id = request.chat_id;

    state.queue.enqueue(task).await.map_err(CoreError::from)?;

    Ok(Json(WebhookResponse { status: "accepted" }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `GET /health`: pings the store connection backing the queue.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.queue.ping().await {
        Ok(()) => "ok",
        Err(_) => "degraded",
    };
    Json(HealthResponse { status })
}

/// `GET /metrics`: Prometheus exposition text. A no-op placeholder unless
/// the `metrics` feature wires a real recorder/exporter at startup; the endpoint is optional.
pub async fn metrics() -> &'static str {
    "# metrics feature disabled\n"
}
