//! Task-type handlers dispatched by [`crate::worker::Worker::run`].

use crate::capabilities::{ChatNotifier, ProductScraper, SentimentAnalyzer, TelegramUpdateHandler};
use crate::config::RetryConfig;
use crate::retry::retry_transient;
use crate::value_score::{self, ScoreInputs};
use serde::{Deserialize, Serialize};
use worthit_core::CoreError;

const REFERENCE_PRICE: f64 = 100.0;

/// Result persisted under `task:<id>` for a completed `product_analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAnalysisResult {
    pub title: String,
    pub price: String,
    pub value_score: f64,
    pub url: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub recommendation: String,
}

fn normalize_price(price: &str) -> f64 {
    price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect::<String>()
        .parse()
        .unwrap_or(0.0)
}

/// Scrapes `url`, analyzes review sentiment, and computes the value score
/// and recommendation. Each external call is retried independently per
/// `retry`.
pub async fn analyze_product<S, A>(
    url: &str,
    scraper: &S,
    analyzer: &A,
    retry: &RetryConfig,
    mut on_retry: impl FnMut(&'static str, usize),
) -> Result<ProductAnalysisResult, CoreError>
where
    S: ProductScraper,
    A: SentimentAnalyzer,
{
    let listing = retry_transient(
        retry,
        || scraper.scrape(url),
        |attempt| on_retry("scrape", attempt),
    )
    .await?;

    let sentiment = retry_transient(
        retry,
        || analyzer.analyze(&listing.reviews),
        |attempt| on_retry("sentiment", attempt),
    )
    .await?;

    let inputs = ScoreInputs {
        rating: listing.rating,
        sentiment: sentiment.average_sentiment,
        feature_count: listing.features.len() as u32,
        price: normalize_price(&listing.price),
        reference_price: REFERENCE_PRICE,
        review_count: listing.reviews.len() as u32,
    };
    let scored = value_score::calculate(inputs);

    Ok(ProductAnalysisResult {
        title: listing.title,
        price: listing.price,
        value_score: scored.score,
        url: url.to_string(),
        pros: sentiment.pros,
        cons: sentiment.cons,
        recommendation: scored.recommendation.to_string(),
    })
}

/// Formats the chat reply for a completed `product_analysis` task.
pub fn format_analysis_message(result: &ProductAnalysisResult) -> String {
    let mut message = format!(
        "*{}*\n\nPrice: {}\nWorthIt score: {}/10\n\n",
        result.title, result.price, result.value_score
    );

    if !result.pros.is_empty() {
        message.push_str("Strengths:\n");
        for pro in result.pros.iter().take(3) {
            message.push_str(&format!("- {pro}\n"));
        }
        message.push('\n');
    }

    if !result.cons.is_empty() {
        message.push_str("Weaknesses:\n");
        for con in result.cons.iter().take(3) {
            message.push_str(&format!("- {con}\n"));
        }
    }

    message
}

/// Dispatches a rehydrated Telegram update, retrying the handler itself on
/// transient failure (e.g. the bot API returning a 5xx).
pub async fn process_telegram_update<T, N>(
    data: &serde_json::Value,
    handler: &T,
    notifier: &N,
    chat_id: Option<&str>,
    retry: &RetryConfig,
    mut on_retry: impl FnMut(usize),
) -> Result<(), CoreError>
where
    T: TelegramUpdateHandler,
    N: ChatNotifier,
{
    let update = crate::capabilities::parse_telegram_update(data)?;
    let reply = retry_transient(retry, || handler.handle(&update), |attempt| on_retry(attempt)).await?;

    if let Some(chat_id) = chat_id {
        notifier.notify(chat_id, &reply).await?;
    }
    Ok(())
}
