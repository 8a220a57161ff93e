//! JSON-file task store.
//!
//! The whole task list lives in a single JSON document, read in full on
//! every query and rewritten atomically (temp file + rename) on every
//! write. Plenty for a personal planner invoked a few times a day; a
//! heavier backend can replace this by implementing [`TaskStore`].

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempo_core::task::{Task, TaskId};
use tempo_engine::{StoreError, TaskStore};

/// A [`TaskStore`] persisted as one JSON file on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`. The file (and its
    /// parent directory) are created lazily on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every task; a missing file is an empty store.
    fn load(&self) -> Result<Vec<Task>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Rewrites the whole document atomically.
    fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json =
            serde_json::to_string_pretty(tasks).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TaskStore for JsonFileStore {
    fn get_by_id(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.load()?.into_iter().find(|t| t.id == *id))
    }

    fn get_children(&self, parent: &TaskId) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|t| t.hierarchy_parent_id.as_ref() == Some(parent))
            .collect())
    }

    fn get_templates(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.load()?.into_iter().filter(Task::is_template).collect())
    }

    fn count_instances(&self, template: &TaskId, date: NaiveDate) -> Result<u32, StoreError> {
        let count = self
            .load()?
            .iter()
            .filter(|t| {
                t.generated_from.as_ref() == Some(template) && t.scheduled_date == Some(date)
            })
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    fn get_fixed_for_date(&self, date: NaiveDate) -> Result<Vec<Task>, StoreError> {
        let mut fixed: Vec<Task> = self
            .load()?
            .into_iter()
            .filter(|t| t.scheduled_date == Some(date) && t.start.is_some() && !t.is_template())
            .collect();
        fixed.sort_by_key(|t| t.start);
        Ok(fixed)
    }

    fn get_backlog(&self) -> Result<Vec<Task>, StoreError> {
        let mut backlog: Vec<Task> = self.load()?.into_iter().filter(Task::is_backlog).collect();
        backlog.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(backlog)
    }

    fn upsert(&self, task: Task) -> Result<(), StoreError> {
        self.upsert_batch(vec![task])
    }

    fn upsert_batch(&self, tasks: Vec<Task>) -> Result<(), StoreError> {
        let mut all = self.load()?;
        for task in tasks {
            if let Some(existing) = all.iter_mut().find(|t| t.id == task.id) {
                *existing = task;
            } else {
                all.push(task);
            }
        }
        self.save(&all)
    }
}
