//! Yield scoring: priority plus deadline urgency.
//!
//! A task's yield score ranks it for auto-placement. The score is a pure
//! function of the task's priority and its deadline relative to the
//! scoring date; higher means schedule sooner. Completed tasks score 0
//! and are excluded from any ranking.

use chrono::NaiveDate;
use tempo_core::task::Task;

/// Weight applied to the ordinal priority.
const PRIORITY_WEIGHT: i64 = 10;

/// Computes the yield score of `task` as of `today`.
///
/// `priority * 10` plus a deadline urgency bonus: overdue or due today
/// +70, within 3 days +60, within a week +40, within two weeks +20,
/// further out +5, no deadline +0.
#[must_use]
pub fn yield_score(task: &Task, today: NaiveDate) -> i64 {
    if task.is_completed {
        return 0;
    }
    let base = i64::from(task.priority) * PRIORITY_WEIGHT;
    base + task.deadline.map_or(0, |d| urgency_bonus(d, today))
}

/// Deadline urgency band for a deadline `d` days away.
fn urgency_bonus(deadline: NaiveDate, today: NaiveDate) -> i64 {
    let days_until = (deadline - today).num_days();
    match days_until {
        ..=0 => 70,
        1..=3 => 60,
        4..=7 => 40,
        8..=14 => 20,
        _ => 5,
    }
}
