//! Queue-specific error type, convertible into [`worthit_core::CoreError`].

use thiserror::Error;
use worthit_core::CoreError;

#[derive(Debug, Error, Clone)]
pub enum QueueError {
    #[error("connection unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("dequeue timed out")]
    DequeueTimedOut,

    #[error("task {0} not found")]
    NotFound(String),

    #[error("malformed task record: {0}")]
    Malformed(String),
}

impl From<QueueError> for CoreError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::ConnectionUnavailable(reason) => CoreError::ConnectionUnavailable { reason },
            QueueError::DequeueTimedOut => CoreError::Timeout {
                layer: "queue.dequeue",
                duration: std::time::Duration::from_secs(5),
            },
            QueueError::NotFound(id) => CoreError::NotFound {
                resource: format!("task {id}"),
            },
            QueueError::Malformed(message) => CoreError::Integrity { message },
        }
    }
}
