//! Unified error taxonomy shared by every crate in the workspace.
//!
//! [`CoreError`] is the one error type every subsystem either returns
//! directly or converts into at its boundary. Keeping the taxonomy in one
//! place means a caller composing the connection manager, the queue, the
//! mesh and the cache never has to write `From` boilerplate between them.
//!
//! # Example
//!
//! ```rust
//! use worthit_core::CoreError;
//!
//! fn handle(err: CoreError) {
//!     match err {
//!         CoreError::CircuitOpen { service } => {
//!             eprintln!("circuit for {service} is open");
//!         }
//!         CoreError::NotFound { resource } => {
//!             eprintln!("{resource} not found");
//!         }
//!         other => eprintln!("{other}"),
//!     }
//! }
//! ```

use std::time::Duration;
use thiserror::Error;

/// The closed set of error kinds that can cross a subsystem boundary.
///
/// Every variant maps to exactly one category described in the error
/// handling design: `Config`, `ConnectionUnavailable`, `Timeout`,
/// `UpstreamTransient`, `UpstreamPermanent`, `CircuitOpen`,
/// `NoHealthyInstance`, `Validation`, `NotFound`, `Integrity`, `Internal`.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    /// A required environment variable was missing or invalid at startup.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description of what was missing or malformed.
        message: String,
    },

    /// The shared connection could not be obtained after exhausting retries.
    #[error("connection unavailable: {reason}")]
    ConnectionUnavailable {
        /// Why the connection could not be established.
        reason: String,
    },

    /// An operation exceeded its allotted time budget.
    #[error("timeout in {layer} after {duration:?}")]
    Timeout {
        /// The layer that timed out (e.g. "queue.dequeue", "mesh.call").
        layer: &'static str,
        /// How long the layer waited before giving up.
        duration: Duration,
    },

    /// A retryable upstream failure: network error or 5xx.
    #[error("upstream transient error from {service}: {message}")]
    UpstreamTransient {
        /// The service that failed.
        service: String,
        /// Description of the failure.
        message: String,
    },

    /// A non-retryable upstream failure: 4xx or similar.
    #[error("upstream permanent error from {service}: {message}")]
    UpstreamPermanent {
        /// The service that failed.
        service: String,
        /// Description of the failure.
        message: String,
    },

    /// A circuit breaker rejected the call outright.
    #[error("circuit open for {service}")]
    CircuitOpen {
        /// The service whose circuit is open.
        service: String,
    },

    /// No instance in the registry was eligible to serve the call.
    #[error("no healthy instance for {service}")]
    NoHealthyInstance {
        /// The service with no eligible instance.
        service: String,
    },

    /// The caller's request was rejected outright (bad input).
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the rejected input.
        message: String,
    },

    /// The requested resource does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Description of the missing resource (e.g. "task abc123").
        resource: String,
    },

    /// Stored data failed an integrity check (corruption, tampering).
    #[error("integrity check failed: {message}")]
    Integrity {
        /// Description of the failed check.
        message: String,
    },

    /// A bug: an invariant the code assumes was violated.
    #[error("internal error: {message}")]
    Internal {
        /// Description for logs only; never shown to end users.
        message: String,
    },
}

impl CoreError {
    /// Returns `true` if this error is safe to retry locally.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Timeout { .. }
                | CoreError::UpstreamTransient { .. }
                | CoreError::ConnectionUnavailable { .. }
        )
    }

    /// Returns `true` if this is a circuit-open rejection.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CoreError::CircuitOpen { .. })
    }

    /// Returns `true` if this is a client/input validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation { .. })
    }

    /// The stable failure category used to pick a localized user message.
    ///
    /// Mirrors the three-bucket taxonomy the worker uses to choose a reply:
    /// `invalid_url`, `auth_error`, or `other`.
    pub fn failure_category(&self) -> &'static str {
        match self {
            CoreError::Validation { .. } => "invalid_url",
            CoreError::UpstreamPermanent { .. } => "auth_error",
            _ => "other",
        }
    }
}
