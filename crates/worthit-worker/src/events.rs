//! Observability events emitted by the worker.

use std::time::{Duration, Instant};
use worthit_core::events::DomainEvent;

#[derive(Debug, Clone)]
pub enum WorkerEvent {
    TaskStarted {
        timestamp: Instant,
        task_id: String,
        task_type: String,
    },
    TaskCompleted {
        timestamp: Instant,
        task_id: String,
        duration: Duration,
    },
    TaskRetried {
        timestamp: Instant,
        task_id: String,
        attempt: usize,
    },
    TaskFailed {
        timestamp: Instant,
        task_id: String,
        failure_category: &'static str,
    },
}

impl DomainEvent for WorkerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WorkerEvent::TaskStarted { .. } => "task_started",
            WorkerEvent::TaskCompleted { .. } => "task_completed",
            WorkerEvent::TaskRetried { .. } => "task_retried",
            WorkerEvent::TaskFailed { .. } => "task_failed",
        }
    }

    fn source_name(&self) -> &str {
        "worthit-worker"
    }

    fn timestamp(&self) -> Instant {
        match self {
            WorkerEvent::TaskStarted { timestamp, .. }
            | WorkerEvent::TaskCompleted { timestamp, .. }
            | WorkerEvent::TaskRetried { timestamp, .. }
            | WorkerEvent::TaskFailed { timestamp, .. } => *timestamp,
        }
    }
}
