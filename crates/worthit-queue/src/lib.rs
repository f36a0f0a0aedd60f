//! Priority FIFO task queue with per-task status records, backed by the
//! shared connection manager from `worthit-connection`.
//!
//! Two priority classes are modeled as two store lists (`worthit_tasks_high`,
//! `worthit_tasks`); a dequeuer checks `high` before `normal` except on every
//! Nth call (default 4th), which checks `normal` first so it is never
//! starved under sustained high-priority load.

mod config;
mod error;
mod events;
mod queue;
mod types;

pub use config::QueueConfig;
pub use error::QueueError;
pub use events::QueueEvent;
pub use queue::TaskQueue;
pub use types::{Priority, StatusPatch, StatusRecord, Task, TaskStatus};
