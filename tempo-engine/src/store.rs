//! The task store contract and an in-memory reference implementation.
//!
//! The engine consumes persistence through [`TaskStore`] and never
//! implements a storage backend itself. Calls are synchronous
//! request/response; implementations with real I/O should enforce a
//! bounded timeout and surface [`StoreError::Timeout`] so a run fails
//! rather than hangs.

use std::collections::HashMap;

use chrono::NaiveDate;
use parking_lot::RwLock;
use tempo_core::task::{Task, TaskId};
use thiserror::Error;

/// Errors a store implementation may surface.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored data could not be decoded.
    #[error("store data corrupt: {0}")]
    Corrupt(String),
    /// A store call exceeded its deadline.
    #[error("store call timed out after {0}ms")]
    Timeout(u64),
}

/// CRUD/query contract the engine runs against.
///
/// `get_children` follows subtask-hierarchy links only; template
/// provenance (`generated_from`) is a separate axis and never feeds
/// completion propagation.
pub trait TaskStore {
    /// Fetches a task by id, `None` if absent.
    fn get_by_id(&self, id: &TaskId) -> Result<Option<Task>, StoreError>;

    /// All direct hierarchy children of `parent`.
    fn get_children(&self, parent: &TaskId) -> Result<Vec<Task>, StoreError>;

    /// All templates (tasks with a non-null recurrence rule).
    fn get_templates(&self) -> Result<Vec<Task>, StoreError>;

    /// How many instances generated from `template` exist on `date`.
    fn count_instances(&self, template: &TaskId, date: NaiveDate) -> Result<u32, StoreError>;

    /// Tasks scheduled on `date` that have a concrete start time, sorted
    /// by start ascending. These are the scheduler's obstacles. Templates
    /// are excluded: their date/time fields describe the pattern, not a
    /// placement.
    fn get_fixed_for_date(&self, date: NaiveDate) -> Result<Vec<Task>, StoreError>;

    /// Unscheduled, incomplete, non-template, non-zone tasks.
    fn get_backlog(&self) -> Result<Vec<Task>, StoreError>;

    /// Inserts or replaces one task.
    fn upsert(&self, task: Task) -> Result<(), StoreError>;

    /// Inserts or replaces many tasks. Not required to be atomic; every
    /// individual write must be an idempotent upsert.
    fn upsert_batch(&self, tasks: Vec<Task>) -> Result<(), StoreError>;
}

/// In-memory task store.
///
/// Thread-safe via [`RwLock`]. Used by engine tests and embeddable
/// callers that do their own persistence.
#[derive(Default)]
pub struct MemoryStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl MemoryStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let map = tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self {
            tasks: RwLock::new(map),
        }
    }

    /// Number of tasks currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    /// Whether the store holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// Snapshot of every task, in unspecified order.
    #[must_use]
    pub fn all(&self) -> Vec<Task> {
        self.tasks.read().values().cloned().collect()
    }
}

impl TaskStore for MemoryStore {
    fn get_by_id(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().get(id).cloned())
    }

    fn get_children(&self, parent: &TaskId) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .tasks
            .read()
            .values()
            .filter(|t| t.hierarchy_parent_id.as_ref() == Some(parent))
            .cloned()
            .collect())
    }

    fn get_templates(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .tasks
            .read()
            .values()
            .filter(|t| t.is_template())
            .cloned()
            .collect())
    }

    fn count_instances(&self, template: &TaskId, date: NaiveDate) -> Result<u32, StoreError> {
        let count = self
            .tasks
            .read()
            .values()
            .filter(|t| {
                t.generated_from.as_ref() == Some(template) && t.scheduled_date == Some(date)
            })
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    fn get_fixed_for_date(&self, date: NaiveDate) -> Result<Vec<Task>, StoreError> {
        let mut fixed: Vec<Task> = self
            .tasks
            .read()
            .values()
            .filter(|t| t.scheduled_date == Some(date) && t.start.is_some() && !t.is_template())
            .cloned()
            .collect();
        fixed.sort_by_key(|t| t.start);
        Ok(fixed)
    }

    fn get_backlog(&self) -> Result<Vec<Task>, StoreError> {
        let mut backlog: Vec<Task> = self
            .tasks
            .read()
            .values()
            .filter(|t| t.is_backlog())
            .cloned()
            .collect();
        // Stable order for deterministic tie-breaks: creation order via
        // the time-ordered id.
        backlog.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(backlog)
    }

    fn upsert(&self, task: Task) -> Result<(), StoreError> {
        self.tasks.write().insert(task.id.clone(), task);
        Ok(())
    }

    fn upsert_batch(&self, tasks: Vec<Task>) -> Result<(), StoreError> {
        let mut map = self.tasks.write();
        for task in tasks {
            map.insert(task.id.clone(), task);
        }
        Ok(())
    }
}
