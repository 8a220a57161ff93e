//! Completion propagation across subtask hierarchies.
//!
//! Toggling a task trickles the new state down to every descendant and
//! bubbles it up through the ancestor chain: a parent is complete iff
//! all of its direct children are complete, and un-completing any child
//! forces every completed ancestor back to incomplete.
//!
//! Both directions use explicit worklists instead of call recursion, so
//! stack growth is bounded and a violated forest invariant (a cycle in
//! the hierarchy graph) is caught by a visited-set instead of looping
//! forever. The full update set is computed against an overlay before
//! anything is written, then committed as a single batch — a failed run
//! writes nothing.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::NaiveDate;
use tempo_core::task::{Task, TaskId};

use crate::store::TaskStore;
use crate::EngineError;

/// Sets `task_id` to `done` and propagates the change through the
/// hierarchy. Returns how many tasks were written.
///
/// Only `hierarchy_parent_id` links participate; template provenance is
/// a different axis and never affects completion.
///
/// # Errors
///
/// - [`EngineError::TaskNotFound`] if `task_id` does not exist; nothing
///   is written.
/// - [`EngineError::CycleDetected`] if the hierarchy revisits a task;
///   nothing is written.
/// - [`EngineError::StoreUnavailable`] on store failure.
pub fn toggle_completion<S: TaskStore>(
    store: &S,
    task_id: &TaskId,
    done: bool,
    today: NaiveDate,
) -> Result<u32, EngineError> {
    let root = store
        .get_by_id(task_id)?
        .ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;

    // Pending writes, keyed by id. Reads below consult this overlay
    // first so decisions see the propagation in progress.
    let mut pending: HashMap<TaskId, Task> = HashMap::new();
    pending.insert(root.id.clone(), set_state(root.clone(), done, today));

    trickle_down(store, &root, done, today, &mut pending)?;
    bubble_up(store, &root, done, today, &mut pending)?;

    let updates: Vec<Task> = pending.into_values().collect();
    let count = u32::try_from(updates.len()).unwrap_or(u32::MAX);
    tracing::debug!(task = %task_id, done, written = count, "completion propagated");
    store.upsert_batch(updates)?;
    Ok(count)
}

/// Applies `done` to every descendant of `root` whose state differs.
fn trickle_down<S: TaskStore>(
    store: &S,
    root: &Task,
    done: bool,
    today: NaiveDate,
    pending: &mut HashMap<TaskId, Task>,
) -> Result<(), EngineError> {
    let mut visited: HashSet<TaskId> = HashSet::from([root.id.clone()]);
    let mut queue: VecDeque<TaskId> = VecDeque::from([root.id.clone()]);

    while let Some(id) = queue.pop_front() {
        for child in store.get_children(&id)? {
            if !visited.insert(child.id.clone()) {
                return Err(EngineError::CycleDetected(child.id));
            }
            queue.push_back(child.id.clone());
            if child.is_completed != done {
                pending.insert(child.id.clone(), set_state(child, done, today));
            }
        }
    }
    Ok(())
}

/// Walks the ancestor chain from `root`, completing parents whose
/// children are now all complete, or un-completing parents that can no
/// longer be complete. Stops at the first ancestor left unchanged.
fn bubble_up<S: TaskStore>(
    store: &S,
    root: &Task,
    done: bool,
    today: NaiveDate,
    pending: &mut HashMap<TaskId, Task>,
) -> Result<(), EngineError> {
    let mut visited: HashSet<TaskId> = HashSet::from([root.id.clone()]);
    let mut current = root.clone();

    while let Some(parent_id) = current.hierarchy_parent_id.clone() {
        if !visited.insert(parent_id.clone()) {
            return Err(EngineError::CycleDetected(parent_id));
        }
        let Some(parent) = store.get_by_id(&parent_id)? else {
            // Dangling parent link; nothing to bubble into.
            break;
        };
        let parent = pending.get(&parent_id).cloned().unwrap_or(parent);

        let changed = if done {
            let children = store.get_children(&parent_id)?;
            let all_done = children.iter().all(|c| {
                pending
                    .get(&c.id)
                    .map_or(c.is_completed, |p| p.is_completed)
            });
            if all_done && !parent.is_completed {
                pending.insert(parent_id.clone(), set_state(parent.clone(), true, today));
                true
            } else {
                false
            }
        } else if parent.is_completed {
            // A parent cannot stay complete with an incomplete child.
            pending.insert(parent_id.clone(), set_state(parent.clone(), false, today));
            true
        } else {
            false
        };

        if !changed {
            break;
        }
        current = parent;
    }
    Ok(())
}

/// Returns `task` with its completion fields set for state `done`.
fn set_state(mut task: Task, done: bool, today: NaiveDate) -> Task {
    task.is_completed = done;
    task.completed_date = done.then_some(today);
    task.touch();
    task
}
