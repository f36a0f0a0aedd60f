//! Worker process entry point: dequeues tasks from the shared queue and
//! dispatches them into the mesh-routed scraper/sentiment/notify
//! capabilities. Exit codes mirror the gateway's: 0 clean shutdown, 1
//! configuration error, 2 unrecoverable dependency failure on startup.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use worthit_cache::{CacheConfig, ResponseCache};
use worthit_connection::{ConnectionManager, ManagerConfig};
use worthit_core::CoreError;
use worthit_mesh::{MeshConfig, ServiceMesh};
use worthit_queue::{QueueConfig, TaskQueue};
use worthit_worker::remote::{ApifyScraper, BotUpdateHandler, HfSentimentAnalyzer, TelegramNotifier};
use worthit_worker::{Worker, WorkerConfig};

/// Process-level flags; each falls back to its env var when not passed.
#[derive(Debug, Parser)]
#[command(name = "worthit-worker")]
struct Args {
    /// Number of concurrent `Worker::run` slots this process runs.
    #[arg(long, env = "WORKER_SLOTS", default_value_t = 1)]
    slots: usize,

    /// Tracing log level filter (e.g. "info", "debug").
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Startup configuration sourced from environment variables, following the
/// gateway's "collect every missing variable into one error" pattern.
struct WorkerEnv {
    redis_url: String,
    redis_ssl: bool,
    apify_token: String,
    hf_token: String,
    telegram_token: String,
}

impl WorkerEnv {
    fn from_env() -> Result<Self, CoreError> {
        let mut missing = Vec::new();
        let required = |name: &'static str, missing: &mut Vec<&'static str>| -> String {
            std::env::var(name).unwrap_or_else(|_| {
                missing.push(name);
                String::new()
            })
        };

        let redis_url = required("REDIS_URL", &mut missing);
        let redis_ssl_raw = required("REDIS_SSL", &mut missing);
        let apify_token = required("APIFY_TOKEN", &mut missing);
        let hf_token = required("HF_TOKEN", &mut missing);
        let telegram_token = required("TELEGRAM_TOKEN", &mut missing);

        if !missing.is_empty() {
            return Err(CoreError::Config {
                message: format!("missing required environment variable(s): {}", missing.join(", ")),
            });
        }

        let redis_ssl = match redis_ssl_raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(CoreError::Config {
                    message: format!("REDIS_SSL must be a boolean, got '{other}'"),
                })
            }
        };

        Ok(Self {
            redis_url,
            redis_ssl,
            apify_token,
            hf_token,
            telegram_token,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log_level))
        .init();

    let env = match WorkerEnv::from_env() {
        Ok(env) => env,
        Err(err) => {
            tracing::error!(%err, "configuration error");
            return ExitCode::from(1);
        }
    };

    let connection = match ConnectionManager::connect(&env.redis_url, env.redis_ssl, ManagerConfig::default()) {
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

    let http = reqwest::Client::new();
    let mesh: Arc<ServiceMesh<()>> = Arc::new(ServiceMesh::new(MeshConfig::default()));
    mesh.register("apify-scraper", "api.apify.com", 443, "/");
    mesh.register("hf-sentiment", "api-inference.huggingface.co", 443, "/");
    let cache = Arc::new(ResponseCache::new(CacheConfig::default()));

    let scraper = ApifyScraper::new(http.clone(), Arc::clone(&mesh), Arc::clone(&cache), env.apify_token);
    let analyzer = HfSentimentAnalyzer::new(http.clone(), Arc::clone(&mesh), Arc::clone(&cache), env.hf_token);
    let notifier = TelegramNotifier::new(http.clone(), env.telegram_token);
    let telegram_handler = BotUpdateHandler;

    let worker = Arc::new(Worker::new(queue, WorkerConfig::default(), scraper, analyzer, notifier, telegram_handler));

    let slots = args.slots.max(1);
    tracing::info!(slots, "worker starting");

    let mut handles = Vec::with_capacity(slots);
    for slot in 0..slots {
        let worker = Arc::clone(&worker);
        handles.push(tokio::spawn(async move {
            if let Err(err) = worker.run().await {
                tracing::error!(slot, %err, "worker slot exited");
            }
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    ExitCode::from(0)
}
