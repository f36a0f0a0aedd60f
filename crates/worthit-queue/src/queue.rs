//! FIFO task queue with priority classes and per-task status records.
//!
//! Built on `lpush`/`brpop` against a single
//! Redis list) generalized to two priority lists, with the status
//! record split out so a task's wire shape on the queue body stays small.

use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::events::QueueEvent;
use crate::types::{Priority, StatusPatch, StatusRecord, Task, TaskStatus};
use chrono::Utc;
use redis::AsyncCommands;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use worthit_connection::ConnectionManager;
use worthit_core::events::EventListeners;

/// Durable FIFO of [`Task`] records, partitioned into `high` and `normal`
/// priority lists, with status tracked separately under `task:<id>`.
pub struct TaskQueue {
    connection: Arc<ConnectionManager>,
    config: QueueConfig,
    dequeue_count: AtomicU64,
    event_listeners: EventListeners<QueueEvent>,
}

impl TaskQueue {
    pub fn new(connection: Arc<ConnectionManager>, config: QueueConfig) -> Self {
        Self {
            connection,
            config,
            dequeue_count: AtomicU64::new(0),
            event_listeners: EventListeners::new(),
        }
    }

    /// Registers an observer for queue events.
    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: worthit_core::events::EventListener<QueueEvent> + 'static,
    {
        self.event_listeners.add(listener);
    }

    /// Assigns an id if absent, stores the task body and its status record
    /// atomically via a pipelined transaction, and returns the id.
    pub async fn enqueue(&self, mut task: Task) -> Result<String, QueueError> {
        if task.id.is_empty() {
            task.id = uuid::Uuid::new_v4().to_string();
        }
        task.status = TaskStatus::Pending;

        let id = task.id.clone();
        let priority = task.priority;
        let queue_key = priority.queue_key();
        let status_key = format!("task:{id}");

        let task_body = serde_json::to_string(&task)
            .map_err(|e| QueueError::Malformed(e.to_string()))?;
        let status_record = StatusRecord::from(task);
        let status_body = serde_json::to_string(&status_record)
            .map_err(|e| QueueError::Malformed(e.to_string()))?;

        let mut conn = self.client().await?;
        redis::pipe()
            .atomic()
            .lpush(queue_key, task_body)
            .set(&status_key, status_body)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| QueueError::ConnectionUnavailable(e.to_string()))?;

        self.event_listeners.emit(&QueueEvent::Enqueued {
            timestamp: Instant::now(),
            task_id: id.clone(),
            priority,
        });

        Ok(id)
    }

    /// Blocks (up to `dequeue_timeout`) for the next task, checking `high`
    /// before `normal` except on every `anti_starvation_ratio`th call, which
    /// checks `normal` first so it can't starve under sustained high-priority
    /// load. Returns `None` on timeout.
    pub async fn dequeue(&self) -> Result<Option<StatusRecord>, QueueError> {
        let start = Instant::now();
        let count = self.dequeue_count.fetch_add(1, Ordering::Relaxed);
        let favor_normal =
            self.config.anti_starvation_ratio > 0 && count % self.config.anti_starvation_ratio as u64 == 0;

        let keys: [&str; 2] = if favor_normal {
            [Priority::Normal.queue_key(), Priority::High.queue_key()]
        } else {
            [Priority::High.queue_key(), Priority::Normal.queue_key()]
        };

        let mut conn = self.client().await?;
        let popped: Option<(String, String)> = conn
            .brpop(&keys[..], self.config.dequeue_timeout.as_secs_f64())
            .await
            .map_err(|e| QueueError::ConnectionUnavailable(e.to_string()))?;

        let Some((_key, body)) = popped else {
            self.event_listeners.emit(&QueueEvent::DequeueTimedOut {
                timestamp: Instant::now(),
            });
            return Ok(None);
        };

        let task: Task =
            serde_json::from_str(&body).map_err(|e| QueueError::Malformed(e.to_string()))?;
        let priority = task.priority;
        let id = task.id.clone();

        let mut record = StatusRecord::from(task);
        record.status = TaskStatus::Processing;
        record.start_time = Some(Utc::now());

        let status_key = format!("task:{id}");
        let status_body =
            serde_json::to_string(&record).map_err(|e| QueueError::Malformed(e.to_string()))?;
        conn.set::<_, _, ()>(&status_key, status_body)
            .await
            .map_err(|e| QueueError::ConnectionUnavailable(e.to_string()))?;

        self.event_listeners.emit(&QueueEvent::Dequeued {
            timestamp: Instant::now(),
            task_id: id,
            priority,
            wait: start.elapsed(),
        });

        Ok(Some(record))
    }

    /// Returns the current status record for `id`, or `None` if unknown.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<StatusRecord>, QueueError> {
        let mut conn = self.client().await?;
        let body: Option<String> = conn
            .get(format!("task:{id}"))
            .await
            .map_err(|e| QueueError::ConnectionUnavailable(e.to_string()))?;

        match body {
            Some(body) => {
                let record = serde_json::from_str(&body)
                    .map_err(|e| QueueError::Malformed(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Merges `patch` into the stored record, recording an end timestamp
    /// when the new status is terminal. Idempotent for an empty patch with
    /// an unchanged status.
    pub async fn update_status(
        &self,
        id: &str,
        status: TaskStatus,
        patch: StatusPatch,
    ) -> Result<(), QueueError> {
        let mut record = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| QueueError::NotFound(id.to_string()))?;

        if record.status.is_terminal() {
            return Ok(());
        }

        record.status = status;
        if let Some(start_time) = patch.start_time {
            record.start_time = Some(start_time);
        }
        if let Some(result) = patch.result {
            record.result = Some(result);
        }
        if let Some(error) = patch.error {
            record.error = Some(error);
        }
        if let Some(retry_count) = patch.retry_count {
            record.retry_count = retry_count;
        }
        if status.is_terminal() && record.end_time.is_none() {
            record.end_time = Some(patch.end_time.unwrap_or_else(Utc::now));
        } else if let Some(end_time) = patch.end_time {
            record.end_time = Some(end_time);
        }

        let mut conn = self.client().await?;
        let body = serde_json::to_string(&record).map_err(|e| QueueError::Malformed(e.to_string()))?;
        conn.set::<_, _, ()>(format!("task:{id}"), body)
            .await
            .map_err(|e| QueueError::ConnectionUnavailable(e.to_string()))?;

        self.event_listeners.emit(&QueueEvent::StatusUpdated {
            timestamp: Instant::now(),
            task_id: id.to_string(),
        });

        Ok(())
    }

    /// Cheap liveness probe for the store connection, used by the gateway's
    /// `/health` endpoint.
    pub async fn ping(&self) -> Result<(), QueueError> {
        let mut conn = self.client().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| QueueError::ConnectionUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn client(&self) -> Result<redis::aio::MultiplexedConnection, QueueError> {
        self.connection
            .get_client()
            .await
            .map_err(|e| QueueError::ConnectionUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anti_starvation_flips_order_every_nth_call() {
        let config = QueueConfig {
            anti_starvation_ratio: 4,
            ..QueueConfig::default()
        };
        let favor_normal_at = |count: u64| config.anti_starvation_ratio > 0 && count % config.anti_starvation_ratio == 0;
        assert!(favor_normal_at(0));
        assert!(!favor_normal_at(1));
        assert!(!favor_normal_at(2));
        assert!(!favor_normal_at(3));
        assert!(favor_normal_at(4));
    }
}
