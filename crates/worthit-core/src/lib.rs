//! Core infrastructure shared across the workspace.
//!
//! This crate provides the pieces every other crate in the pipeline needs
//! and none should redefine:
//! - [`CoreError`], the closed error taxonomy
//! - An event system for observability ([`events`])
//! - Backoff math for reconnects and retries ([`backoff`])
//! - An AIMD controller usable for retry budgets or adaptive concurrency
//! - Health-triggerable integration for health-check-driven circuit control

pub mod aimd;
pub mod backoff;
pub mod error;
pub mod events;
pub mod health_integration;

pub use aimd::{AimdConfig, AimdController};
pub use backoff::{
    ExponentialBackoff, ExponentialRandomBackoff, FixedInterval, FnInterval, IntervalFunction,
};
pub use error::CoreError;
pub use events::{DomainEvent, EventListener, EventListeners, FnListener};
pub use health_integration::{HealthTriggerable, SharedHealthTrigger, TriggerHealth};
