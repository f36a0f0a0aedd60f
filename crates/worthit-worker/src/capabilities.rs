//! Capability traits the worker depends on instead of concrete bot/gateway
//! types, breaking the cyclic bot/worker/gateway dependency.
//!
//! Each trait returns `impl Future + Send`, matching the idiom in
//! `tower-resilience-healthcheck`'s `HealthChecker` rather than pulling in
//! `async_trait`. The worker is generic over these, not boxed — one worker
//! wiring, chosen at startup.

use serde_json::Value;
use std::future::Future;
use worthit_core::CoreError;

/// A scraped product listing.
#[derive(Debug, Clone)]
pub struct ProductListing {
    pub title: String,
    pub price: String,
    pub rating: f64,
    pub reviews: Vec<String>,
    pub features: Vec<String>,
}

/// Resolves a product URL into a listing. Transient network failures and
/// HTTP 5xx should surface as `CoreError::UpstreamTransient`; a bad or
/// unreachable URL as `CoreError::Validation`; auth failures as
/// `CoreError::UpstreamPermanent`.
pub trait ProductScraper: Send + Sync {
    fn scrape(&self, url: &str) -> impl Future<Output = Result<ProductListing, CoreError>> + Send;
}

/// Sentiment analysis over a batch of review texts, returning the average
/// on a 1..5 scale and a pros/cons summary.
#[derive(Debug, Clone)]
pub struct SentimentSummary {
    pub average_sentiment: f64,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, reviews: &[String]) -> impl Future<Output = Result<SentimentSummary, CoreError>> + Send;
}

/// Delivers a reply to the chat that originated a task.
pub trait ChatNotifier: Send + Sync {
    fn notify(&self, chat_id: &str, message: &str) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Rehydrated `telegram_update` payload, dispatched by kind.
#[derive(Debug, Clone)]
pub enum TelegramUpdateKind {
    Command { name: String, args: Vec<String> },
    Text(String),
    Callback { data: String },
}

/// Reacts to an inbound Telegram update and returns the reply text.
pub trait TelegramUpdateHandler: Send + Sync {
    fn handle(&self, update: &TelegramUpdateKind) -> impl Future<Output = Result<String, CoreError>> + Send;
}

/// Parses a `telegram_update` task's JSON payload into a dispatchable kind.
pub fn parse_telegram_update(data: &Value) -> Result<TelegramUpdateKind, CoreError> {
    if let Some(command) = data.get("command").and_then(Value::as_str) {
        let args = data
            .get("args")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        return Ok(TelegramUpdateKind::Command {
            name: command.to_string(),
            args,
        });
    }
    if let Some(callback_data) = data.get("callback_data").and_then(Value::as_str) {
        return Ok(TelegramUpdateKind::Callback {
            data: callback_data.to_string(),
        });
    }
    if let Some(text) = data.get("text").and_then(Value::as_str) {
        return Ok(TelegramUpdateKind::Text(text.to_string()));
    }
    Err(CoreError::Validation {
        message: "telegram_update payload has no command, callback_data or text".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_command_updates() {
        let data = json!({"command": "start", "args": ["foo"]});
        let parsed = parse_telegram_update(&data).unwrap();
        assert!(matches!(parsed, TelegramUpdateKind::Command { name, args } if name == "start" && args == vec!["foo".to_string()]));
    }

    #[test]
    fn parses_plain_text_updates() {
        let data = json!({"text": "hello"});
        let parsed = parse_telegram_update(&data).unwrap();
        assert!(matches!(parsed, TelegramUpdateKind::Text(text) if text == "hello"));
    }

    #[test]
    fn rejects_payload_with_no_recognizable_field() {
        let data = json!({"unexpected": true});
        assert!(parse_telegram_update(&data).is_err());
    }
}
