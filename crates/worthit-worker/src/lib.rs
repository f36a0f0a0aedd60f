//! Task worker: dequeues from `worthit-queue`, dispatches by task type,
//! retries transient external failures with bounded exponential backoff,
//! and computes the bounded value score for product analyses.
//!
//! The worker never implements more than one capability itself — it depends
//! on [`ProductScraper`], [`SentimentAnalyzer`], [`ChatNotifier`] and
//! [`TelegramUpdateHandler`], each supplied by the caller, so the crate has
//! no cyclic dependency on a bot or gateway crate.

mod capabilities;
mod config;
mod error;
mod events;
mod handlers;
pub mod remote;
mod retry;
mod value_score;
mod worker;

pub use capabilities::{
    ChatNotifier, ProductListing, ProductScraper, SentimentAnalyzer, SentimentSummary,
    TelegramUpdateHandler, TelegramUpdateKind,
};
pub use config::{RetryConfig, WorkerConfig};
pub use error::WorkerError;
pub use events::WorkerEvent;
pub use handlers::{analyze_product, format_analysis_message, ProductAnalysisResult};
pub use value_score::{calculate as calculate_value_score, ScoreInputs, ValueScore};
pub use worker::Worker;
