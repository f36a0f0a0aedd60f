//! HTTP-backed capability implementations: the concrete `ProductScraper`,
//! `SentimentAnalyzer`, `ChatNotifier` and `TelegramUpdateHandler` a worker
//! process actually runs.
//!
//! Scraper and sentiment calls go through a shared [`ServiceMesh`] (circuit
//! breaker plus instance selection) and a shared [`ResponseCache`] (cache
//! hit skips the mesh and the network entirely). Telegram notification
//! talks to a single fixed bot-API endpoint directly; there is no pool of
//! interchangeable instances to register or load-balance over.

use crate::capabilities::{
    ChatNotifier, ProductListing, ProductScraper, SentimentAnalyzer, SentimentSummary,
    TelegramUpdateHandler, TelegramUpdateKind,
};
use serde::Deserialize;
use std::future::Future;
use std::sync::{Arc, Mutex};
use worthit_cache::{CacheError, CachedResponse, ResponseCache, Source};
use worthit_core::CoreError;
use worthit_mesh::{Instance, ServiceMesh, Strategy};

const APIFY_SERVICE: &str = "apify-scraper";
const HF_SERVICE: &str = "hf-sentiment";

/// Selects a mesh instance, runs `make_request` behind the cache, and
/// feeds the real outcome back into the circuit breaker. A cache hit never
/// touches the mesh or the network at all.
async fn call_mesh_cached<'a, F, Fut>(
    mesh: &ServiceMesh<()>,
    cache: &ResponseCache,
    service: &'static str,
    cache_path: &str,
    query_pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    make_request: F,
) -> Result<CachedResponse, CoreError>
where
    F: FnOnce(Instance) -> Fut,
    Fut: Future<Output = Result<CachedResponse, CoreError>>,
{
    let instance = mesh.get_service(service, Strategy::RoundRobin)?;

    let captured: Arc<Mutex<Option<CoreError>>> = Arc::new(Mutex::new(None));
    let captured_for_fetch = Arc::clone(&captured);

    let outcome = cache
        .get_or_fetch(cache_path, query_pairs, move || async move {
            make_request(instance).await.map_err(|err| {
                *captured_for_fetch.lock().unwrap() = Some(err.clone());
                CacheError::Upstream(err.to_string())
            })
        })
        .await;

    match outcome {
        Ok((response, Source::Upstream)) => {
            mesh.record_success(service);
            Ok(response)
        }
        Ok((response, Source::Cache)) => Ok(response),
        Err(_) => {
            mesh.record_failure(service);
            Err(captured.lock().unwrap().take().unwrap_or_else(|| CoreError::UpstreamTransient {
                service: service.to_string(),
                message: "cache fetch failed".to_string(),
            }))
        }
    }
}

/// Classifies an HTTP response into a [`CachedResponse`] or a [`CoreError`]
/// carrying the right retry/circuit-breaker semantics: 2xx is a hit, 401/403
/// is a permanent auth failure, other 4xx is a validation failure (not
/// counted against the circuit), and a network error or 5xx is transient.
async fn classify_response(response: reqwest::Response, service: &str) -> Result<CachedResponse, CoreError> {
    let status = response.status();
    if status.is_success() {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| CoreError::UpstreamTransient {
                service: service.to_string(),
                message: e.to_string(),
            })?
            .to_vec();
        return Ok(CachedResponse { body, content_type });
    }

    let message = response.text().await.unwrap_or_else(|_| status.to_string());
    if status.as_u16() == 401 || status.as_u16() == 403 {
        Err(CoreError::UpstreamPermanent {
            service: service.to_string(),
            message,
        })
    } else if status.is_client_error() {
        Err(CoreError::Validation { message })
    } else {
        Err(CoreError::UpstreamTransient {
            service: service.to_string(),
            message,
        })
    }
}

fn transient(service: &str, err: reqwest::Error) -> CoreError {
    CoreError::UpstreamTransient {
        service: service.to_string(),
        message: err.to_string(),
    }
}

/// Scrapes a product listing via an Apify actor run, fronted by the mesh
/// and the response cache.
pub struct ApifyScraper {
    client: reqwest::Client,
    mesh: Arc<ServiceMesh<()>>,
    cache: Arc<ResponseCache>,
    token: String,
}

impl ApifyScraper {
    pub fn new(client: reqwest::Client, mesh: Arc<ServiceMesh<()>>, cache: Arc<ResponseCache>, token: String) -> Self {
        Self { client, mesh, cache, token }
    }
}

#[derive(Debug, Deserialize)]
struct ApifyListing {
    title: String,
    price: String,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    reviews: Vec<String>,
    #[serde(default)]
    features: Vec<String>,
}

impl ProductScraper for ApifyScraper {
    async fn scrape(&self, url: &str) -> Result<ProductListing, CoreError> {
        let client = self.client.clone();
        let token = self.token.clone();
        let target = url.to_string();

        let response = call_mesh_cached(
            &self.mesh,
            &self.cache,
            APIFY_SERVICE,
            "/apify/acts/amazon-product-scraper/run-sync-get-dataset-items",
            [("url", url)],
            move |instance| async move {
                let endpoint = format!(
                    "https://{}/v2/acts/amazon-product-scraper/run-sync-get-dataset-items",
                    instance.host
                );
                let response = client
                    .post(&endpoint)
                    .query(&[("token", token.as_str())])
                    .json(&serde_json::json!({ "startUrls": [{ "url": target }] }))
                    .send()
                    .await
                    .map_err(|e| transient(APIFY_SERVICE, e))?;
                classify_response(response, APIFY_SERVICE).await
            },
        )
        .await?;

        let listing: ApifyListing = serde_json::from_slice(&response.body).map_err(|e| CoreError::Integrity {
            message: format!("malformed apify response: {e}"),
        })?;

        Ok(ProductListing {
            title: listing.title,
            price: listing.price,
            rating: listing.rating,
            reviews: listing.reviews,
            features: listing.features,
        })
    }
}

/// Scores review sentiment via HuggingFace's multilingual BERT sentiment
/// model, fronted by the mesh and the response cache.
pub struct HfSentimentAnalyzer {
    client: reqwest::Client,
    mesh: Arc<ServiceMesh<()>>,
    cache: Arc<ResponseCache>,
    token: String,
}

impl HfSentimentAnalyzer {
    pub fn new(client: reqwest::Client, mesh: Arc<ServiceMesh<()>>, cache: Arc<ResponseCache>, token: String) -> Self {
        Self { client, mesh, cache, token }
    }
}

#[derive(Debug, Deserialize)]
struct HfLabelScore {
    label: String,
    score: f64,
}

/// BERT-multilingual-sentiment labels are `"N stars"`; a malformed label
/// defaults to neutral, matching the original processor's fallback.
fn parse_star_rating(label: &str) -> u32 {
    label.split_whitespace().next().and_then(|s| s.parse().ok()).unwrap_or(3)
}

fn excerpt(text: &str) -> String {
    text.chars().take(80).collect()
}

impl SentimentAnalyzer for HfSentimentAnalyzer {
    async fn analyze(&self, reviews: &[String]) -> Result<SentimentSummary, CoreError> {
        if reviews.is_empty() {
            return Ok(SentimentSummary {
                average_sentiment: 3.0,
                pros: Vec::new(),
                cons: Vec::new(),
            });
        }

        let client = self.client.clone();
        let token = self.token.clone();
        let batch = reviews.to_vec();
        let batch_key = reviews.join("\u{1f}");

        let response = call_mesh_cached(
            &self.mesh,
            &self.cache,
            HF_SERVICE,
            "/hf/models/nlptown/bert-base-multilingual-uncased-sentiment",
            [("batch", batch_key.as_str())],
            move |instance| async move {
                let endpoint = format!(
                    "https://{}/models/nlptown/bert-base-multilingual-uncased-sentiment",
                    instance.host
                );
                let response = client
                    .post(&endpoint)
                    .bearer_auth(&token)
                    .json(&serde_json::json!({ "inputs": batch }))
                    .send()
                    .await
                    .map_err(|e| transient(HF_SERVICE, e))?;
                classify_response(response, HF_SERVICE).await
            },
        )
        .await?;

        let parsed: Vec<Vec<HfLabelScore>> = serde_json::from_slice(&response.body).map_err(|e| CoreError::Integrity {
            message: format!("malformed huggingface response: {e}"),
        })?;

        let ratings: Vec<u32> = parsed
            .iter()
            .map(|labels| {
                labels
                    .iter()
                    .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|top| parse_star_rating(&top.label))
                    .unwrap_or(3)
            })
            .collect();

        let average_sentiment = ratings.iter().sum::<u32>() as f64 / ratings.len() as f64;

        let mut ranked: Vec<(u32, &String)> = ratings.iter().copied().zip(reviews.iter()).collect();
        ranked.sort_by_key(|(rating, _)| *rating);
        let cons = ranked.iter().take(2).map(|(_, text)| excerpt(text)).collect();
        let pros = ranked.iter().rev().take(2).map(|(_, text)| excerpt(text)).collect();

        Ok(SentimentSummary {
            average_sentiment,
            pros,
            cons,
        })
    }
}

/// Delivers a reply via the Telegram Bot API. A single fixed endpoint, not
/// a pool of interchangeable instances, so this bypasses the mesh.
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: String,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, token: String) -> Self {
        Self { client, token }
    }
}

impl ChatNotifier for TelegramNotifier {
    async fn notify(&self, chat_id: &str, message: &str) -> Result<(), CoreError> {
        let endpoint = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let response = self
            .client
            .post(&endpoint)
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "text": message,
                "parse_mode": "Markdown",
            }))
            .send()
            .await
            .map_err(|e| transient("telegram", e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_else(|_| status.to_string());
        if status.as_u16() == 401 || status.as_u16() == 403 {
            Err(CoreError::UpstreamPermanent {
                service: "telegram".to_string(),
                message: body,
            })
        } else {
            Err(CoreError::UpstreamTransient {
                service: "telegram".to_string(),
                message: body,
            })
        }
    }
}

/// Replies to inbound Telegram updates with the same canned flow as the
/// original bot: a `/start` greeting, an acknowledgement for a pasted
/// product link, and a nudge back to that flow for anything else.
pub struct BotUpdateHandler;

impl TelegramUpdateHandler for BotUpdateHandler {
    async fn handle(&self, update: &TelegramUpdateKind) -> Result<String, CoreError> {
        let reply = match update {
            TelegramUpdateKind::Command { name, .. } if name == "start" => {
                "Welcome to WorthIt! Send a product link and I'll tell you if it's worth the price.".to_string()
            }
            TelegramUpdateKind::Command { name, .. } => {
                format!("Unrecognized command /{name}. Send a product link to get started.")
            }
            TelegramUpdateKind::Text(text) if text.starts_with("http://") || text.starts_with("https://") => {
                "Got it, analyzing that link now.".to_string()
            }
            TelegramUpdateKind::Text(_) => {
                "Send a product link and I'll tell you if it's worth the price.".to_string()
            }
            TelegramUpdateKind::Callback { .. } => "Got it.".to_string(),
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_rating_parses_leading_digit() {
        assert_eq!(parse_star_rating("4 stars"), 4);
        assert_eq!(parse_star_rating("garbage"), 3);
    }

    #[tokio::test]
    async fn start_command_gets_the_welcome_reply() {
        let handler = BotUpdateHandler;
        let reply = handler
            .handle(&TelegramUpdateKind::Command {
                name: "start".to_string(),
                args: vec![],
            })
            .await
            .unwrap();
        assert!(reply.contains("Welcome"));
    }

    #[tokio::test]
    async fn plain_text_without_a_link_gets_the_nudge() {
        let handler = BotUpdateHandler;
        let reply = handler.handle(&TelegramUpdateKind::Text("hello".to_string())).await.unwrap();
        assert!(reply.contains("product link"));
    }
}
