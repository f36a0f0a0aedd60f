//! The worker main loop: dequeue, dispatch by task type, retry, and record
//! the outcome.

use crate::capabilities::{ChatNotifier, ProductScraper, SentimentAnalyzer, TelegramUpdateHandler};
use crate::config::WorkerConfig;
use crate::error::{localized_failure_message, WorkerError};
use crate::events::WorkerEvent;
use crate::handlers::{analyze_product, format_analysis_message, process_telegram_update};
use std::sync::Arc;
use std::time::Instant;
use worthit_core::events::{EventListener, EventListeners};
use worthit_core::CoreError;
use worthit_queue::{StatusPatch, Task, TaskQueue, TaskStatus};

/// Ties the queue to the capability implementations the worker dispatches
/// into. Generic, not boxed: one worker wiring per process.
pub struct Worker<S, A, N, T> {
    queue: Arc<TaskQueue>,
    config: WorkerConfig,
    scraper: S,
    analyzer: A,
    notifier: N,
    telegram_handler: T,
    events: EventListeners<WorkerEvent>,
}

impl<S, A, N, T> Worker<S, A, N, T>
where
    S: ProductScraper,
    A: SentimentAnalyzer,
    N: ChatNotifier,
    T: TelegramUpdateHandler,
{
    pub fn new(queue: Arc<TaskQueue>, config: WorkerConfig, scraper: S, analyzer: A, notifier: N, telegram_handler: T) -> Self {
        Self {
            queue,
            config,
            scraper,
            analyzer,
            notifier,
            telegram_handler,
            events: EventListeners::new(),
        }
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: EventListener<WorkerEvent> + 'static,
    {
        self.events.add(listener);
    }

    /// The main loop: blocks on the queue, dispatches one task at a time,
    /// and never returns except on a fatal queue error.
    pub async fn run(&self) -> Result<(), CoreError> {
        loop {
            let record = match self.queue.dequeue().await {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(err) => return Err(err.into()),
            };

            self.events.emit(&WorkerEvent::TaskStarted {
                timestamp: Instant::now(),
                task_id: record.id.clone(),
                task_type: record.task_type.clone(),
            });
            let started = Instant::now();

            let outcome = match record.task_type.as_str() {
                "product_analysis" => self.run_product_analysis(&record).await,
                "telegram_update" => self.run_telegram_update(&record).await,
                other => Err(WorkerError::UnknownTaskType(other.to_string()).into()),
            };

            match outcome {
                Ok(()) => {
                    self.events.emit(&WorkerEvent::TaskCompleted {
                        timestamp: Instant::now(),
                        task_id: record.id.clone(),
                        duration: started.elapsed(),
                    });
                }
                Err(err) => self.handle_failure(&record, err).await,
            }
        }
    }

    async fn run_product_analysis(&self, record: &worthit_queue::StatusRecord) -> Result<(), CoreError> {
        let url = record
            .data
            .get("url")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| CoreError::from(WorkerError::MissingField("url".to_string())))?;

        let task_id = record.id.clone();
        let result = analyze_product(url, &self.scraper, &self.analyzer, &self.config.retry, |service, attempt| {
            self.events.emit(&WorkerEvent::TaskRetried {
                timestamp: Instant::now(),
                task_id: task_id.clone(),
                attempt,
            });
            let _ = service;
        })
        .await?;

        let result_value = serde_json::to_value(&result)
            .map_err(|e| CoreError::Internal { message: e.to_string() })?;
        self.queue
            .update_status(
                &record.id,
                TaskStatus::Completed,
                StatusPatch {
                    result: Some(result_value),
                    ..Default::default()
                },
            )
            .await?;

        if let Some(chat_id) = &record.chat_id {
            let message = format_analysis_message(&result);
            let _ = self.notifier.notify(chat_id, &message).await;
        }

        Ok(())
    }

    async fn run_telegram_update(&self, record: &worthit_queue::StatusRecord) -> Result<(), CoreError> {
        let task_id = record.id.clone();
        process_telegram_update(
            &record.data,
            &self.telegram_handler,
            &self.notifier,
            record.chat_id.as_deref(),
            &self.config.retry,
            |attempt| {
                self.events.emit(&WorkerEvent::TaskRetried {
                    timestamp: Instant::now(),
                    task_id: task_id.clone(),
                    attempt,
                });
            },
        )
        .await?;

        self.queue
            .update_status(&record.id, TaskStatus::Completed, StatusPatch::default())
            .await?;
        Ok(())
    }

    /// Either re-enqueues with an incremented retry counter (transient
    /// failure, budget remaining) or marks the task permanently `failed`.
    async fn handle_failure(&self, record: &worthit_queue::StatusRecord, err: CoreError) {
        let retryable = err.is_retryable() && record.retry_count + 1 < record.max_retries;

        if retryable {
            let retry_count = record.retry_count + 1;
            let mut task = Task::new(record.task_type.clone(), record.data.clone(), record.priority);
            task.id = record.id.clone();
            task.retry_count = retry_count;
            task.max_retries = record.max_retries;
            task.chat_id = record.chat_id.clone();
            let _ = self.queue.enqueue(task).await;
            let _ = self
                .queue
                .update_status(
                    &record.id,
                    TaskStatus::Pending,
                    StatusPatch {
                        retry_count: Some(retry_count),
                        error: Some(err.to_string()),
                        ..Default::default()
                    },
                )
                .await;
            return;
        }

        let message = localized_failure_message(&err);
        let _ = self
            .queue
            .update_status(
                &record.id,
                TaskStatus::Failed,
                StatusPatch {
                    error: Some(err.to_string()),
                    ..Default::default()
                },
            )
            .await;

        if let Some(chat_id) = &record.chat_id {
            let _ = self.notifier.notify(chat_id, message).await;
        }

        self.events.emit(&WorkerEvent::TaskFailed {
            timestamp: Instant::now(),
            task_id: record.id.clone(),
            failure_category: err.failure_category(),
        });
    }
}
