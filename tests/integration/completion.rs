//! Integration tests for completion propagation over task hierarchies.
//!
//! Builds multi-level project trees and verifies the settle-state
//! invariant: a task with children is complete iff all of its direct
//! children are complete.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::NaiveDate;
use tempo_core::task::{Task, TaskId};
use tempo_engine::completion::toggle_completion;
use tempo_engine::{EngineError, MemoryStore, TaskStore};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
}

fn child_of(title: &str, parent: &Task) -> Task {
    let mut t = Task::new(title);
    t.hierarchy_parent_id = Some(parent.id.clone());
    t
}

/// Three-level tree: project -> {analysis, build -> {code, tests}}.
fn project_tree() -> (Vec<Task>, Task, Task, Task, Task, Task) {
    let project = Task::new("project");
    let analysis = child_of("analysis", &project);
    let build = child_of("build", &project);
    let code = child_of("code", &build);
    let tests = child_of("tests", &build);
    let all = vec![
        project.clone(),
        analysis.clone(),
        build.clone(),
        code.clone(),
        tests.clone(),
    ];
    (all, project, analysis, build, code, tests)
}

fn is_done(store: &MemoryStore, id: &TaskId) -> bool {
    store.get_by_id(id).unwrap().unwrap().is_completed
}

/// Checks the settle invariant over every task in the store.
fn assert_settled(store: &MemoryStore) {
    for task in store.all() {
        let children = store.get_children(&task.id).unwrap();
        if children.is_empty() {
            continue;
        }
        let all_children_done = children.iter().all(|c| c.is_completed);
        assert_eq!(
            task.is_completed, all_children_done,
            "task '{}' inconsistent with its children",
            task.title
        );
    }
}

// ===========================================================================
// Trickle-down
// ===========================================================================

#[test]
fn completing_the_root_completes_the_whole_tree() {
    let (all, project, ..) = project_tree();
    let store = MemoryStore::with_tasks(all);

    let written = toggle_completion(&store, &project.id, true, today()).unwrap();
    assert_eq!(written, 5);
    for task in store.all() {
        assert!(task.is_completed);
        assert_eq!(task.completed_date, Some(today()));
    }
    assert_settled(&store);
}

#[test]
fn reopening_the_root_reopens_every_descendant() {
    let (all, project, ..) = project_tree();
    let store = MemoryStore::with_tasks(all);

    toggle_completion(&store, &project.id, true, today()).unwrap();
    toggle_completion(&store, &project.id, false, today()).unwrap();

    for task in store.all() {
        assert!(!task.is_completed);
        assert_eq!(task.completed_date, None);
    }
    assert_settled(&store);
}

// ===========================================================================
// Bubble-up
// ===========================================================================

#[test]
fn completing_leaves_one_by_one_settles_upward() {
    let (all, project, analysis, build, code, tests) = project_tree();
    let store = MemoryStore::with_tasks(all);

    toggle_completion(&store, &code.id, true, today()).unwrap();
    assert!(!is_done(&store, &build.id), "tests still open");

    toggle_completion(&store, &tests.id, true, today()).unwrap();
    assert!(is_done(&store, &build.id), "both build children done");
    assert!(!is_done(&store, &project.id), "analysis still open");

    toggle_completion(&store, &analysis.id, true, today()).unwrap();
    assert!(is_done(&store, &project.id), "everything done");
    assert_settled(&store);
}

#[test]
fn reopening_a_deep_leaf_reopens_the_chain_above_it() {
    let (all, project, analysis, build, code, _tests) = project_tree();
    let store = MemoryStore::with_tasks(all);

    toggle_completion(&store, &project.id, true, today()).unwrap();
    toggle_completion(&store, &code.id, false, today()).unwrap();

    assert!(!is_done(&store, &code.id));
    assert!(!is_done(&store, &build.id));
    assert!(!is_done(&store, &project.id));
    // The sibling branch keeps its own state.
    assert!(is_done(&store, &analysis.id));
    assert_settled(&store);
}

// ===========================================================================
// Failure modes
// ===========================================================================

#[test]
fn toggling_a_missing_task_changes_nothing() {
    let (all, ..) = project_tree();
    let store = MemoryStore::with_tasks(all.clone());

    let err = toggle_completion(&store, &TaskId::new(), true, today()).unwrap_err();
    assert!(matches!(err, EngineError::TaskNotFound(_)));

    let mut before = all;
    let mut after = store.all();
    before.sort_by(|a, b| a.id.cmp(&b.id));
    after.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(before, after);
}

#[test]
fn hierarchy_cycle_is_reported_not_looped() {
    let mut a = Task::new("a");
    let mut b = Task::new("b");
    let mut c = Task::new("c");
    b.hierarchy_parent_id = Some(a.id.clone());
    c.hierarchy_parent_id = Some(b.id.clone());
    a.hierarchy_parent_id = Some(c.id.clone());
    let store = MemoryStore::with_tasks([a.clone(), b, c]);

    let err = toggle_completion(&store, &a.id, true, today()).unwrap_err();
    assert!(matches!(err, EngineError::CycleDetected(_)));
    // Nothing was committed.
    assert!(store.all().iter().all(|t| !t.is_completed));
}

#[test]
fn repeated_toggles_converge() {
    let (all, project, _, _, code, _) = project_tree();
    let store = MemoryStore::with_tasks(all);

    for _ in 0..3 {
        toggle_completion(&store, &code.id, true, today()).unwrap();
        toggle_completion(&store, &code.id, false, today()).unwrap();
    }
    assert!(!is_done(&store, &code.id));
    assert!(!is_done(&store, &project.id));
    assert_settled(&store);
}
