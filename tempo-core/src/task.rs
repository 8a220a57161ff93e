//! The central `Task` entity and its identifier.
//!
//! A task is either a plain one-off item, a fixed "zone" commitment, a
//! recurrence template, or an instance generated from a template.
//! Subtask hierarchy and template provenance are two separate links
//! (`hierarchy_parent_id` and `generated_from`), so deleting a generated
//! instance can never be confused with deleting a subtask.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default duration assigned to a task when none is given, in minutes.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Default category for tasks created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A planner task.
///
/// Dates and times are fully typed; `recurrence_rule` is kept as raw rule
/// text and parsed by the engine once per run, so one malformed rule
/// degrades to "never spawn" instead of failing store deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier (UUID v7, time-ordered).
    pub id: TaskId,
    /// Parent task in the subtask-of-project hierarchy, if any.
    pub hierarchy_parent_id: Option<TaskId>,
    /// Template this task was generated from, if it is a recurrence instance.
    pub generated_from: Option<TaskId>,
    /// Short task title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Category the task belongs to.
    pub category_id: String,
    /// Ordinal priority, 1 (lowest) to 4 (highest).
    pub priority: u8,
    /// Calendar date the task is placed on, if scheduled.
    pub scheduled_date: Option<NaiveDate>,
    /// Placement start, if scheduled with a concrete time.
    pub start: Option<NaiveDateTime>,
    /// Placement end, if scheduled with a concrete time.
    pub end: Option<NaiveDateTime>,
    /// How long the task takes, in minutes.
    pub duration_minutes: i64,
    /// Fixed, immovable commitment (appointment, class). Zones are
    /// obstacles to the scheduler, never movable backlog.
    #[serde(default)]
    pub is_zone: bool,
    /// Raw recurrence rule text; non-null only on a template. A template
    /// is never itself placed on the calendar — its date/time fields
    /// describe the pattern's anchor and time-of-day only.
    pub recurrence_rule: Option<String>,
    /// Deadline used for urgency scoring.
    pub deadline: Option<NaiveDate>,
    /// Whether the task is done.
    #[serde(default)]
    pub is_completed: bool,
    /// Date the task was completed, if it is.
    pub completed_date: Option<NaiveDate>,
    /// Estimated effort in 5-minute blocks.
    #[serde(default)]
    pub estimated_blocks: u32,
    /// Actual effort spent, in 5-minute blocks.
    #[serde(default)]
    pub total_blocks_spent: u32,
    /// Last-write timestamp in epoch milliseconds. Used by external sync
    /// for last-writer-wins conflict resolution, never by the engine.
    pub updated_at: u64,
}

impl Task {
    /// Creates a new backlog task with default fields.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            hierarchy_parent_id: None,
            generated_from: None,
            title: title.into(),
            description: String::new(),
            category_id: DEFAULT_CATEGORY.to_string(),
            priority: 1,
            scheduled_date: None,
            start: None,
            end: None,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            is_zone: false,
            recurrence_rule: None,
            deadline: None,
            is_completed: false,
            completed_date: None,
            estimated_blocks: 0,
            total_blocks_spent: 0,
            updated_at: now_ms(),
        }
    }

    /// Whether this task is a recurrence template.
    #[must_use]
    pub const fn is_template(&self) -> bool {
        self.recurrence_rule.is_some()
    }

    /// Whether this task is eligible for auto-placement: unscheduled,
    /// incomplete, not a template, not a zone.
    #[must_use]
    pub const fn is_backlog(&self) -> bool {
        self.scheduled_date.is_none()
            && !self.is_completed
            && self.recurrence_rule.is_none()
            && !self.is_zone
    }

    /// Refreshes `updated_at` to the current wall-clock time.
    pub fn touch(&mut self) {
        self.updated_at = now_ms();
    }
}

/// Returns the current timestamp in milliseconds since epoch.
#[must_use]
pub fn now_ms() -> u64 {
    u64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
    )
    .unwrap_or(u64::MAX)
}
