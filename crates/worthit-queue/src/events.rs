//! Observability events emitted by the queue.

use crate::types::Priority;
use std::time::Instant;
use worthit_core::events::DomainEvent;

/// Domain events the queue emits through its `EventListeners<QueueEvent>`.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    Enqueued {
        timestamp: Instant,
        task_id: String,
        priority: Priority,
    },
    Dequeued {
        timestamp: Instant,
        task_id: String,
        priority: Priority,
        wait: std::time::Duration,
    },
    DequeueTimedOut {
        timestamp: Instant,
    },
    StatusUpdated {
        timestamp: Instant,
        task_id: String,
    },
}

impl DomainEvent for QueueEvent {
    fn event_type(&self) -> &'static str {
        match self {
            QueueEvent::Enqueued { .. } => "enqueued",
            QueueEvent::Dequeued { .. } => "dequeued",
            QueueEvent::DequeueTimedOut { .. } => "dequeue_timed_out",
            QueueEvent::StatusUpdated { .. } => "status_updated",
        }
    }

    fn source_name(&self) -> &str {
        "worthit-queue"
    }

    fn timestamp(&self) -> Instant {
        match self {
            QueueEvent::Enqueued { timestamp, .. }
            | QueueEvent::Dequeued { timestamp, .. }
            | QueueEvent::DequeueTimedOut { timestamp }
            | QueueEvent::StatusUpdated { timestamp, .. } => *timestamp,
        }
    }
}
