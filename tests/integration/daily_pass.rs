//! Integration tests for the daily scheduling pass.
//!
//! Exercises recurrence expansion, slot discovery, and greedy placement
//! end to end over the in-memory store: idempotent generation, no
//! overlap with fixed commitments, and per-slot capacity bounds.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tempo_core::task::Task;
use tempo_engine::{Engine, EngineConfig, MemoryStore, TaskStore};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Monday, 2026-02-16.
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    today().and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

fn zone(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> Task {
    let mut t = Task::new(title);
    t.is_zone = true;
    t.scheduled_date = Some(start.date());
    t.start = Some(start);
    t.end = Some(end);
    t.duration_minutes = (end - start).num_minutes();
    t
}

fn backlog(title: &str, minutes: i64, priority: u8) -> Task {
    let mut t = Task::new(title);
    t.duration_minutes = minutes;
    t.priority = priority;
    t
}

fn template(title: &str, rule: &str, start: Option<(u32, u32)>, minutes: i64) -> Task {
    let mut t = Task::new(title);
    t.recurrence_rule = Some(rule.to_string());
    t.scheduled_date = Some(today());
    t.duration_minutes = minutes;
    if let Some((h, m)) = start {
        t.start = Some(at(h, m));
        t.end = Some(at(h, m) + Duration::minutes(minutes));
    }
    t
}

fn engine_over(tasks: Vec<Task>, forecast_days: u32) -> Engine<MemoryStore> {
    Engine::with_config(
        MemoryStore::with_tasks(tasks),
        EngineConfig {
            forecast_days,
            ..EngineConfig::default()
        },
    )
}

fn assert_schedule_consistent(store: &MemoryStore, date: NaiveDate) {
    let fixed = store.get_fixed_for_date(date).unwrap();
    for (i, a) in fixed.iter().enumerate() {
        let (Some(a_start), Some(a_end)) = (a.start, a.end) else {
            continue;
        };
        assert!(a_end > a_start, "{} has inverted times", a.title);
        if a.is_zone {
            continue;
        }
        // Placed tasks may not intersect anything else on the calendar.
        for b in fixed.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, b)| b) {
            let (Some(b_start), Some(b_end)) = (b.start, b.end) else {
                continue;
            };
            assert!(
                a_end <= b_start || b_end <= a_start,
                "{} overlaps {}",
                a.title,
                b.title
            );
        }
    }
}

// ===========================================================================
// Recurrence expansion
// ===========================================================================

#[test]
fn standup_template_expands_once_per_day() {
    // Daily "Standup" at 09:00 for 15 minutes over a 3-day window.
    let engine = engine_over(vec![template("Standup", "FREQ=DAILY", Some((9, 0)), 15)], 2);

    let report = engine.run_daily_pass(today()).unwrap();
    assert_eq!(report.instances_spawned, 3);

    for offset in 0..3 {
        let date = today() + Duration::days(offset);
        let day = engine.store().get_fixed_for_date(date).unwrap();
        let standups: Vec<_> = day.iter().filter(|t| t.title == "Standup").collect();
        assert_eq!(standups.len(), 1, "exactly one instance on {date}");
        assert_eq!(
            standups[0].start,
            Some(date.and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()))
        );
    }
}

#[test]
fn second_pass_generates_nothing() {
    let engine = engine_over(vec![template("Standup", "FREQ=DAILY", Some((9, 0)), 15)], 2);

    let first = engine.run_daily_pass(today()).unwrap();
    assert_eq!(first.instances_spawned, 3);

    let second = engine.run_daily_pass(today()).unwrap();
    assert_eq!(second.instances_spawned, 0);
    assert_eq!(engine.store().len(), 4); // template + 3 instances, unchanged
}

#[test]
fn weekly_template_spawns_on_its_weekdays_only() {
    // 2026-02-16 is a Monday; a full week forecast hits Mon and Wed once each.
    let engine = engine_over(
        vec![template("Gym", "FREQ=WEEKLY;BYDAY=MO,WE", None, 60)],
        6,
    );

    let report = engine.run_daily_pass(today()).unwrap();
    assert_eq!(report.instances_spawned, 2);
}

#[test]
fn malformed_template_does_not_poison_the_batch() {
    let engine = engine_over(
        vec![
            template("broken", "EVERY=DAY", None, 30),
            template("works", "FREQ=DAILY", None, 30),
        ],
        0,
    );

    let report = engine.run_daily_pass(today()).unwrap();
    assert_eq!(report.instances_spawned, 1);
}

#[test]
fn templates_are_never_placed_themselves() {
    let engine = engine_over(vec![template("Standup", "FREQ=DAILY", Some((9, 0)), 15)], 0);
    engine.run_daily_pass(today()).unwrap();

    let template_task = engine
        .store()
        .get_templates()
        .unwrap()
        .pop()
        .expect("template survives the pass");
    // The template keeps its pattern fields; only instances carry placements.
    assert!(template_task.is_template());
    assert_eq!(template_task.scheduled_date, Some(today()));
}

// ===========================================================================
// Auto-scheduling
// ===========================================================================

#[test]
fn backlog_fills_gaps_around_zones() {
    let engine = engine_over(
        vec![
            zone("morning meeting", at(9, 0), at(10, 0)),
            zone("lunch", at(13, 0), at(14, 0)),
            backlog("deep work", 180, 4),
            backlog("email", 30, 1),
        ],
        0,
    );

    let report = engine.run_daily_pass(today()).unwrap();
    assert_eq!(report.tasks_placed, 2);
    assert_schedule_consistent(engine.store(), today());

    // Highest yield lands in the earliest slot that fits it: 180m fits
    // the 10:00–13:00 gap, not the 08:00–09:00 one; email takes 08:00.
    let fixed = engine.store().get_fixed_for_date(today()).unwrap();
    let deep = fixed.iter().find(|t| t.title == "deep work").unwrap();
    let email = fixed.iter().find(|t| t.title == "email").unwrap();
    assert_eq!(email.start, Some(at(8, 0)));
    assert_eq!(deep.start, Some(at(10, 0)));
}

#[test]
fn oversized_task_stays_in_backlog_without_error() {
    let engine = engine_over(
        vec![
            zone("all day", at(8, 30), at(21, 45)),
            backlog("needs a clear day", 240, 4),
        ],
        0,
    );

    let report = engine.run_daily_pass(today()).unwrap();
    assert_eq!(report.tasks_placed, 0);
    assert_eq!(engine.store().get_backlog().unwrap().len(), 1);
}

#[test]
fn zones_are_never_moved() {
    let z = zone("immovable", at(9, 0), at(10, 0));
    let z_id = z.id.clone();
    let engine = engine_over(vec![z, backlog("filler", 60, 2)], 0);

    engine.run_daily_pass(today()).unwrap();
    let after = engine.store().get_by_id(&z_id).unwrap().unwrap();
    assert_eq!(after.start, Some(at(9, 0)));
    assert_eq!(after.end, Some(at(10, 0)));
}

// ===========================================================================
// Full pass: expansion feeding placement
// ===========================================================================

#[test]
fn spawned_instances_become_obstacles_for_placement() {
    // The daily standup instance at 09:00 must constrain today's placement.
    let engine = engine_over(
        vec![
            template("Standup", "FREQ=DAILY", Some((9, 0)), 60),
            backlog("report", 60, 3),
        ],
        0,
    );

    let report = engine.run_daily_pass(today()).unwrap();
    assert_eq!(report.instances_spawned, 1);
    assert_eq!(report.tasks_placed, 1);
    assert_schedule_consistent(engine.store(), today());

    let fixed = engine.store().get_fixed_for_date(today()).unwrap();
    let report_task = fixed.iter().find(|t| t.title == "report").unwrap();
    assert_eq!(report_task.start, Some(at(8, 0))); // the gap before standup
}

#[test]
fn retrying_a_whole_pass_is_safe() {
    let engine = engine_over(
        vec![
            template("Standup", "FREQ=DAILY", Some((9, 0)), 15),
            backlog("solo", 45, 2),
        ],
        1,
    );

    engine.run_daily_pass(today()).unwrap();
    let snapshot: usize = engine.store().len();

    // Simulated at-least-once trigger delivery: same day, same inputs.
    let rerun = engine.run_daily_pass(today()).unwrap();
    assert_eq!(rerun.instances_spawned, 0);
    assert_eq!(rerun.tasks_placed, 0);
    assert_eq!(engine.store().len(), snapshot);
}
