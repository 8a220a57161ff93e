//! Scheduling engine for the Tempo planner.
//!
//! The engine is sequential, re-entrant-safe batch logic: a daily trigger
//! (cron, a timer unit, or the CLI) invokes [`Engine::run_daily_pass`],
//! which expands recurrence templates into dated instances and then fills
//! the day's free time with prioritized backlog work. Completion state is
//! kept consistent across subtask hierarchies by
//! [`completion::toggle_completion`], invoked whenever a user toggles a
//! task.
//!
//! All writes are idempotent upserts through the [`store::TaskStore`]
//! contract, so duplicate trigger invocations and wholesale retries after
//! a store failure are safe. Concurrent runs for the same user and day
//! are not — external serialization (e.g. a unique-work-name policy in
//! the trigger layer) is assumed.

pub mod completion;
pub mod engine;
pub mod recurrence;
pub mod scheduler;
pub mod score;
pub mod slots;
pub mod store;

pub use engine::{Engine, EngineConfig, PassReport};
pub use store::{MemoryStore, StoreError, TaskStore};

use tempo_core::task::TaskId;
use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A store read or write failed; the whole run fails and may be
    /// retried wholesale.
    #[error("task store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    /// The task a toggle was addressed to does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The hierarchy graph revisited a task during propagation, which
    /// means the assumed-forest invariant is violated.
    #[error("cycle detected in task hierarchy at {0}")]
    CycleDetected(TaskId),
}
