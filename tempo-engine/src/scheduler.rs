//! Greedy auto-scheduling of backlog work into free slots.
//!
//! The planner is explicitly greedy and non-optimal: slots are filled in
//! chronological order with the highest-yield tasks that fit, first-fit
//! within each slot, no backtracking and no re-ordering of anything
//! already placed. Tasks that fit nowhere simply stay in the backlog.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tempo_core::task::{Task, TaskId};

use crate::score::yield_score;
use crate::slots::free_slots;
use crate::store::TaskStore;
use crate::EngineError;

/// A single scheduling decision: where one task will go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// The task being placed.
    pub task_id: TaskId,
    /// Assigned start time.
    pub start: NaiveDateTime,
    /// Assigned end time (`start + duration`).
    pub end: NaiveDateTime,
}

/// Plans placements for `backlog` into the free time `fixed` leaves open
/// between `day_start` and `day_end`. Pure: nothing is written.
///
/// Backlog tasks are ranked by yield score descending (ties keep input
/// order), then each free slot is filled first-fit: scan the ranking,
/// place every still-unplaced task whose duration fits the remaining
/// capacity, packing placements back to back from the slot's start.
///
/// Guarantees: placements never overlap each other or any fixed task,
/// per-slot placed duration never exceeds the slot's capacity, and a
/// task is placed at most once.
#[must_use]
pub fn plan_day(
    fixed: &[Task],
    backlog: &[Task],
    day_start: NaiveDateTime,
    day_end: NaiveDateTime,
    min_gap_minutes: i64,
    today: NaiveDate,
) -> Vec<Placement> {
    let slots = free_slots(fixed, day_start, day_end, min_gap_minutes);

    let mut ranked: Vec<&Task> = backlog
        .iter()
        .filter(|t| !t.is_completed && t.scheduled_date.is_none())
        .collect();
    // Stable sort keeps input order as the tie-break.
    ranked.sort_by_key(|t| std::cmp::Reverse(yield_score(t, today)));

    let mut placed = vec![false; ranked.len()];
    let mut placements = Vec::new();

    for slot in slots {
        let mut remaining = slot.duration_minutes;
        let mut cursor = slot.start;

        loop {
            let Some(shortest) = shortest_unplaced(&ranked, &placed) else {
                break;
            };
            if remaining < shortest {
                break;
            }
            let mut advanced = false;
            for (i, task) in ranked.iter().enumerate() {
                if placed[i] || task.duration_minutes > remaining || task.duration_minutes <= 0 {
                    continue;
                }
                let end = cursor + Duration::minutes(task.duration_minutes);
                placements.push(Placement {
                    task_id: task.id.clone(),
                    start: cursor,
                    end,
                });
                cursor = end;
                remaining -= task.duration_minutes;
                placed[i] = true;
                advanced = true;
            }
            if !advanced {
                break;
            }
        }
    }

    placements
}

/// Duration of the shortest task not yet placed, if any remain.
fn shortest_unplaced(ranked: &[&Task], placed: &[bool]) -> Option<i64> {
    ranked
        .iter()
        .zip(placed)
        .filter(|&(t, done)| !done && t.duration_minutes > 0)
        .map(|(t, _)| t.duration_minutes)
        .min()
}

/// Reads the day's fixed tasks and the backlog, plans placements, and
/// commits them to the store as one batch of upserts.
///
/// Returns the number of tasks placed.
///
/// # Errors
///
/// Returns [`EngineError::StoreUnavailable`] if any store call fails.
pub fn schedule_day<S: TaskStore>(
    store: &S,
    date: NaiveDate,
    day_start: NaiveTime,
    day_end: NaiveTime,
    min_gap_minutes: i64,
) -> Result<u32, EngineError> {
    let fixed = store.get_fixed_for_date(date)?;
    let backlog = store.get_backlog()?;

    let placements = plan_day(
        &fixed,
        &backlog,
        date.and_time(day_start),
        date.and_time(day_end),
        min_gap_minutes,
        date,
    );
    if placements.is_empty() {
        tracing::debug!(%date, backlog = backlog.len(), "nothing to place");
        return Ok(0);
    }

    let mut updates = Vec::with_capacity(placements.len());
    for placement in &placements {
        let Some(task) = backlog.iter().find(|t| t.id == placement.task_id) else {
            continue;
        };
        let mut task = task.clone();
        task.scheduled_date = Some(date);
        task.start = Some(placement.start);
        task.end = Some(placement.end);
        task.touch();
        updates.push(task);
    }

    let count = u32::try_from(updates.len()).unwrap_or(u32::MAX);
    tracing::info!(%date, placed = count, "auto-schedule complete");
    store.upsert_batch(updates)?;
    Ok(count)
}
