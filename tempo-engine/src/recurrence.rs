//! Recurrence expansion: templates into dated instances.
//!
//! A template is a task carrying a recurrence rule; it is never placed
//! on the calendar itself. Each daily pass walks the forecast window and
//! spawns the instances that do not exist yet. Expansion is idempotent:
//! an existence check per `(template, date)` pair precedes every insert,
//! so re-running over the same window creates nothing new.

use chrono::{Datelike, Duration, NaiveDate};
use tempo_core::rule::{Frequency, RecurrenceRule};
use tempo_core::task::Task;

use crate::store::TaskStore;
use crate::EngineError;

/// Expands every template over `today .. today + forecast_days`,
/// inserting missing instances. Returns how many were spawned.
///
/// A template whose rule fails to parse is skipped for the whole run
/// (logged, never fatal to the batch).
///
/// # Errors
///
/// Returns [`EngineError::StoreUnavailable`] if any store call fails.
pub fn expand<S: TaskStore>(
    store: &S,
    today: NaiveDate,
    forecast_days: u32,
) -> Result<u32, EngineError> {
    let templates = store.get_templates()?;
    let mut spawned = 0;

    for template in &templates {
        let Some(rule_text) = template.recurrence_rule.as_deref() else {
            continue;
        };
        let rule: RecurrenceRule = match rule_text.parse() {
            Ok(rule) => rule,
            Err(e) => {
                tracing::warn!(template = %template.id, error = %e, "skipping template with malformed rule");
                continue;
            }
        };

        for offset in 0..=i64::from(forecast_days) {
            let target = today + Duration::days(offset);
            if !should_spawn(template, &rule, today, target) {
                continue;
            }
            if store.count_instances(&template.id, target)? > 0 {
                continue;
            }
            let instance = spawn_instance(template, target);
            tracing::debug!(template = %template.id, instance = %instance.id, date = %target, "spawned instance");
            store.upsert(instance)?;
            spawned += 1;
        }
    }

    if spawned > 0 {
        tracing::info!(count = spawned, templates = templates.len(), "recurrence expansion complete");
    }
    Ok(spawned)
}

/// Whether `template` with parsed `rule` should produce an instance on
/// `target`.
///
/// The anchor is the template's own pattern date when present; an ad-hoc
/// template created without one anchors to the run date. Dates before
/// the anchor never spawn.
#[must_use]
pub fn should_spawn(
    template: &Task,
    rule: &RecurrenceRule,
    run_date: NaiveDate,
    target: NaiveDate,
) -> bool {
    let anchor = template.scheduled_date.unwrap_or(run_date);
    if target < anchor {
        return false;
    }
    match rule.frequency {
        Frequency::Daily => {
            let days_since = (target - anchor).num_days();
            days_since % i64::from(rule.interval) == 0
        }
        Frequency::Weekly => rule.fires_on_weekday(target.weekday()),
        Frequency::Monthly => {
            u8::try_from(target.day()).is_ok_and(|d| rule.fires_on_month_day(d))
        }
    }
}

/// Builds the dated instance for `template` on `target`.
///
/// The instance copies the template's fields under a fresh id, clears
/// the rule, records provenance, and shifts any start/end to `target`
/// while preserving the template's time-of-day.
#[must_use]
pub fn spawn_instance(template: &Task, target: NaiveDate) -> Task {
    let mut instance = template.clone();
    instance.id = tempo_core::task::TaskId::new();
    instance.recurrence_rule = None;
    instance.generated_from = Some(template.id.clone());
    instance.scheduled_date = Some(target);
    instance.start = template.start.map(|dt| target.and_time(dt.time()));
    instance.end = template.end.map(|dt| target.and_time(dt.time()));
    instance.is_completed = false;
    instance.completed_date = None;
    instance.touch();
    instance
}
