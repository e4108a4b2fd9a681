use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::task::{Status, Task};

/// In-memory task sequence mirrored to a single `tasks.json` file.
///
/// Order is insertion order until an explicit sort. Every mutating
/// operation writes the full sequence back to disk before returning, so a
/// successful call leaves the file equal to memory.
#[derive(Debug)]
pub struct TaskStore {
    pub tasks: Vec<Task>,
    backing_path: PathBuf,
}

impl TaskStore {
    /// Open the store rooted at `data_dir`, creating the directory if
    /// needed. A missing backing file means a first run and yields an
    /// empty store; an unreadable or malformed file is an error.
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let backing_path = data_dir.join("tasks.json");
        let tasks = if backing_path.exists() {
            load_tasks(&backing_path)?
        } else {
            Vec::new()
        };

        info!(
            file = %backing_path.display(),
            count = tasks.len(),
            "opened task store"
        );

        Ok(Self {
            tasks,
            backing_path,
        })
    }

    pub fn backing_path(&self) -> &Path {
        &self.backing_path
    }

    /// Append a fresh task and persist. Returns the created record.
    #[tracing::instrument(skip(self, name, description, date))]
    pub fn add(
        &mut self,
        name: String,
        description: String,
        date: DateTime<Utc>,
    ) -> anyhow::Result<Task> {
        let task = Task::new(name, description, date);
        debug!(id = %task.id, "adding task");
        self.tasks.push(task.clone());
        self.save()?;
        Ok(task)
    }

    /// Remove every task whose id appears in `ids`. Unknown ids are
    /// skipped. Returns the number removed; nothing is written when that
    /// number is zero.
    #[tracing::instrument(skip(self, ids))]
    pub fn delete_ids(&mut self, ids: &[Uuid]) -> anyhow::Result<usize> {
        let before = self.tasks.len();
        self.tasks.retain(|task| !ids.contains(&task.id));
        let removed = before - self.tasks.len();

        if removed > 0 {
            self.save()?;
        }
        debug!(removed, remaining = self.tasks.len(), "deleted tasks by id");
        Ok(removed)
    }

    /// Remove tasks by zero-based list position. Out-of-bounds positions
    /// are ignored. Returns the number removed.
    #[tracing::instrument(skip(self, positions))]
    pub fn delete_positions(&mut self, positions: &[usize]) -> anyhow::Result<usize> {
        let mut in_bounds: Vec<usize> = positions
            .iter()
            .copied()
            .filter(|&idx| idx < self.tasks.len())
            .collect();
        in_bounds.sort_unstable();
        in_bounds.dedup();

        // Back to front so earlier removals don't shift later positions.
        for &idx in in_bounds.iter().rev() {
            self.tasks.remove(idx);
        }

        if !in_bounds.is_empty() {
            self.save()?;
        }
        debug!(
            removed = in_bounds.len(),
            remaining = self.tasks.len(),
            "deleted tasks by position"
        );
        Ok(in_bounds.len())
    }

    /// Advance the addressed task one step along the status cycle and
    /// persist. `None` when the id is unknown; nothing is written then.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn toggle_status(&mut self, id: Uuid) -> anyhow::Result<Option<Status>> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("toggle on unknown id is a no-op");
            return Ok(None);
        };

        task.status = task.status.advanced();
        let status = task.status;
        self.save()?;
        debug!(status = status.label(), "advanced task status");
        Ok(Some(status))
    }

    /// Stable ascending sort on due date; ties keep their relative order.
    #[tracing::instrument(skip(self))]
    pub fn sort_by_date(&mut self) -> anyhow::Result<()> {
        self.tasks.sort_by_key(|task| task.date);
        self.save()
    }

    /// Stable ascending sort on status rank
    /// (`NotStarted < InProgress < Completed`).
    #[tracing::instrument(skip(self))]
    pub fn sort_by_status(&mut self) -> anyhow::Result<()> {
        self.tasks.sort_by_key(|task| task.status.rank());
        self.save()
    }

    /// Re-read the backing file. On any failure the in-memory sequence is
    /// left untouched and the error is returned.
    #[tracing::instrument(skip(self))]
    pub fn reload(&mut self) -> anyhow::Result<()> {
        let tasks = load_tasks(&self.backing_path)?;
        self.tasks = tasks;
        Ok(())
    }

    /// Encode the full sequence and atomically replace the backing file.
    /// On failure the previous file contents remain.
    #[tracing::instrument(skip(self))]
    pub fn save(&self) -> anyhow::Result<()> {
        save_tasks_atomic(&self.backing_path, &self.tasks)
            .with_context(|| format!("failed to save {}", self.backing_path.display()))
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Resolve a user-supplied handle to a task id: a prefix of the UUID
    /// string, or an exact (case-insensitive) task name. Ambiguity is an
    /// error listing the candidates.
    pub fn resolve_handle(&self, handle: &str) -> anyhow::Result<Uuid> {
        let needle = handle.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Err(anyhow!("empty task id"));
        }

        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| {
                task.id.to_string().starts_with(&needle)
                    || task.name.eq_ignore_ascii_case(handle.trim())
            })
            .collect();

        match matches.len() {
            0 => Err(anyhow!("no task matches '{handle}'")),
            1 => Ok(matches[0].id),
            _ => {
                let mut msg = format!("'{handle}' matches multiple tasks:\n");
                for task in matches {
                    msg.push_str(&format!("  {}  {}\n", task.id, task.name));
                }
                msg.push_str("use a longer id prefix");
                Err(anyhow!(msg))
            }
        }
    }
}

#[tracing::instrument(skip(path))]
fn load_tasks(path: &Path) -> anyhow::Result<Vec<Task>> {
    debug!(file = %path.display(), "loading tasks");
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let tasks: Vec<Task> =
        serde_json::from_str(&raw).with_context(|| format!("failed parsing {}", path.display()))?;

    debug!(count = tasks.len(), "loaded tasks");
    Ok(tasks)
}

#[tracing::instrument(skip(path, tasks))]
fn save_tasks_atomic(path: &Path, tasks: &[Task]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = tasks.len(), "saving tasks atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, tasks)?;
    temp.write_all(b"\n")?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
