//! Free-slot discovery around fixed commitments.

use chrono::NaiveDateTime;
use tempo_core::slot::TimeSlot;
use tempo_core::task::Task;

/// Default minimum gap worth reporting, in minutes.
pub const DEFAULT_MIN_GAP_MINUTES: i64 = 30;

/// Computes the free time slots between `day_start` and `day_end` left
/// open by `fixed` tasks.
///
/// Fixed tasks missing a start or end time are excluded silently (a
/// data-quality issue, not an engine error). Overlapping fixed tasks are
/// handled by advancing the cursor monotonically, never subtracting.
/// Gaps shorter than `min_gap_minutes` are dropped. Output is
/// chronologically ordered and non-overlapping by construction.
#[must_use]
pub fn free_slots(
    fixed: &[Task],
    day_start: NaiveDateTime,
    day_end: NaiveDateTime,
    min_gap_minutes: i64,
) -> Vec<TimeSlot> {
    let mut timed: Vec<(NaiveDateTime, NaiveDateTime)> = fixed
        .iter()
        .filter_map(|t| Some((t.start?, t.end?)))
        .collect();
    timed.sort_by_key(|(start, _)| *start);

    let mut slots = Vec::new();
    let mut cursor = day_start;

    for (start, end) in timed {
        if start > cursor {
            let gap = (start - cursor).num_minutes();
            if gap >= min_gap_minutes {
                slots.push(TimeSlot::new(cursor, gap));
            }
        }
        cursor = cursor.max(end);
    }

    if day_end > cursor {
        let gap = (day_end - cursor).num_minutes();
        if gap >= min_gap_minutes {
            slots.push(TimeSlot::new(cursor, gap));
        }
    }

    slots
}
