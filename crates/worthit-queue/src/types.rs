//! Task and status-record shapes shared by the queue and every producer/consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Priority class a task is enqueued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
}

impl Priority {
    /// The store list key this priority class is pushed/popped on.
    pub fn queue_key(self) -> &'static str {
        match self {
            Priority::High => "worthit_tasks_high",
            Priority::Normal => "worthit_tasks",
        }
    }
}

/// Lifecycle state of a task. Transitions only ever move left to right;
/// `completed`/`failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// `true` for `completed` and `failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// A task as it sits on the queue body (before a worker has touched it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub task_type: String,
    pub data: Value,
    pub status: TaskStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub chat_id: Option<String>,
}

impl Task {
    /// Builds a new task with a fresh id and `pending` status, defaulting
    /// `max_retries` to 3 (the worker's bounded-retry budget).
    pub fn new(task_type: impl Into<String>, data: Value, priority: Priority) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_type: task_type.into(),
            data,
            status: TaskStatus::Pending,
            priority,
            created_at: Utc::now(),
            retry_count: 0,
            max_retries: 3,
            chat_id: None,
        }
    }

    /// Sets the originating chat id, returned with for consuming builders.
    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }
}

/// Status record stored under `task:<id>`: the task plus timing and outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: String,
    pub task_type: String,
    pub data: Value,
    pub status: TaskStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub chat_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl From<Task> for StatusRecord {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            task_type: task.task_type,
            data: task.data,
            status: task.status,
            priority: task.priority,
            created_at: task.created_at,
            retry_count: task.retry_count,
            max_retries: task.max_retries,
            chat_id: task.chat_id,
            start_time: None,
            end_time: None,
            result: None,
            error: None,
        }
    }
}

/// Partial update applied by `update_status`. `None` fields are left
/// untouched on the stored record.
#[derive(Debug, Clone, Default)]
pub struct StatusPatch {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub retry_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
    }

    #[test]
    fn queue_keys_match_store_layout() {
        assert_eq!(Priority::High.queue_key(), "worthit_tasks_high");
        assert_eq!(Priority::Normal.queue_key(), "worthit_tasks");
    }

    #[test]
    fn new_task_defaults() {
        let task = Task::new("product_analysis", serde_json::json!({"url": "x"}), Priority::Normal);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.retry_count, 0);
        assert_eq!(task.max_retries, 3);
        assert!(!task.id.is_empty());
    }
}
