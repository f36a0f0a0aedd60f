//! Worker-specific error type, convertible into [`worthit_core::CoreError`].

use thiserror::Error;
use worthit_core::CoreError;

#[derive(Debug, Error, Clone)]
pub enum WorkerError {
    #[error("unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("missing required field {0}")]
    MissingField(String),

    #[error("upstream transient error from {service}: {message}")]
    Transient { service: String, message: String },

    #[error("upstream permanent error from {service}: {message}")]
    Permanent { service: String, message: String },
}

impl From<WorkerError> for CoreError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::UnknownTaskType(task_type) => CoreError::Validation {
                message: format!("unknown task type: {task_type}"),
            },
            WorkerError::MissingField(field) => CoreError::Validation {
                message: format!("missing required field {field}"),
            },
            WorkerError::Transient { service, message } => {
                CoreError::UpstreamTransient { service, message }
            }
            WorkerError::Permanent { service, message } => {
                CoreError::UpstreamPermanent { service, message }
            }
        }
    }
}

/// Maps a [`CoreError`]'s failure category to the localized message shown to
/// the originating chat when a task exhausts its retries.
pub fn localized_failure_message(err: &CoreError) -> &'static str {
    match err.failure_category() {
        "invalid_url" => "The product link looks invalid or unreachable. Double-check the URL and try again.",
        "auth_error" => "We couldn't authenticate with one of our upstream providers. Please try again later.",
        _ => "Something went wrong while analyzing this product. Please try again later.",
    }
}
