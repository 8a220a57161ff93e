//! Free time intervals.

use chrono::{Duration, NaiveDateTime};

/// A contiguous span of unclaimed time within a day. Transient — slots are
/// computed per scheduling pass and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    /// When the free span begins.
    pub start: NaiveDateTime,
    /// Length of the span, in minutes.
    pub duration_minutes: i64,
}

impl TimeSlot {
    /// Creates a slot starting at `start` lasting `duration_minutes`.
    #[must_use]
    pub const fn new(start: NaiveDateTime, duration_minutes: i64) -> Self {
        Self {
            start,
            duration_minutes,
        }
    }

    /// When the free span ends (exclusive).
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(self.duration_minutes)
    }
}
