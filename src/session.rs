//! A loaded workspace: the persisted task list and display preference.
//!
//! Both the CLI and the terminal UI drive the repository through a
//! `Session`, so every mutation is mirrored to the store the same way.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::repository::{ImportReport, TaskRepository};
use crate::stats::TaskStats;
use crate::store::{Persisted, Store, DARK_MODE_KEY, TASKS_KEY};
use crate::task::{NewTask, Task, TaskId};

pub struct Session {
    config: Config,
    tasks: Persisted<TaskRepository>,
    dark_mode: Persisted<bool>,
}

impl Session {
    /// Load both slots from the configured data directory.
    /// An unusable data directory is logged and the session runs in memory.
    pub fn open(config: Config) -> Self {
        if let Err(e) = config.ensure_data_dir() {
            warn!(dir = %config.data_dir.display(), error = %e, "cannot create data directory");
        }
        let store = Store::open(&config.data_dir);
        let tasks = Persisted::load(store.clone(), TASKS_KEY, TaskRepository::new());
        let dark_mode = Persisted::load(store, DARK_MODE_KEY, false);
        info!(dir = %config.data_dir.display(), tasks = tasks.get().len(), "session opened");
        Session { config, tasks, dark_mode }
    }

    pub fn repo(&self) -> &TaskRepository {
        self.tasks.get()
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.get().tasks()
    }

    pub fn stats(&self, today: NaiveDate) -> TaskStats {
        TaskStats::compute(self.tasks(), today)
    }

    pub fn dark_mode(&self) -> bool {
        *self.dark_mode.get()
    }

    pub fn set_dark_mode(&mut self, on: bool) {
        self.dark_mode.set(on);
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode.update(|v| {
            *v = !*v;
            *v
        })
    }

    /// Add a task; `None` when the title was blank.
    pub fn add(&mut self, new: NewTask, now: DateTime<Utc>) -> Option<TaskId> {
        if new.title.trim().is_empty() {
            return None;
        }
        self.tasks.update(|repo| repo.add(new, now).map(|t| t.id.clone()))
    }

    pub fn toggle_complete(&mut self, id: &TaskId, now: DateTime<Utc>) -> Option<bool> {
        self.repo().get(id)?;
        self.tasks.update(|repo| repo.toggle_complete(id, now))
    }

    pub fn delete(&mut self, id: &TaskId) -> bool {
        if self.repo().get(id).is_none() {
            return false;
        }
        self.tasks.update(|repo| repo.delete(id))
    }

    pub fn complete_all(&mut self, now: DateTime<Utc>) -> usize {
        self.tasks.update(|repo| repo.complete_all(now))
    }

    pub fn delete_completed(&mut self) -> usize {
        self.tasks.update(|repo| repo.delete_completed())
    }

    /// Write the export document to `path`.
    pub fn export_to(&self, path: &Path) -> Result<usize> {
        let json = self.repo().export_json()?;
        fs::write(path, json)?;
        info!(path = %path.display(), tasks = self.tasks().len(), "exported tasks");
        Ok(self.tasks().len())
    }

    pub fn export_json(&self) -> Result<String> {
        self.repo().export_json()
    }

    /// Import a task document. The list is untouched if it is rejected.
    pub fn import_json(&mut self, text: &str) -> Result<ImportReport> {
        self.tasks.try_update(|repo| repo.import_json(text))
    }

    /// Read and import a file, backing up the task slot first when asked.
    pub fn import_file(&mut self, path: &Path, backup: bool, now: DateTime<Local>) -> Result<ImportReport> {
        let text = fs::read_to_string(path)?;
        if backup {
            match self.create_backup(now) {
                Ok(Some(dest)) => info!(backup = %dest.display(), "created backup before import"),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "failed to create backup before import"),
            }
        }
        self.import_json(&text)
    }

    /// Copy the task slot into the backup directory. `None` when there is
    /// nothing on disk yet.
    pub fn create_backup(&self, now: DateTime<Local>) -> Result<Option<PathBuf>> {
        let slot = self.tasks.store().slot_path(TASKS_KEY);
        if !slot.exists() {
            return Ok(None);
        }
        let backup_dir = self.config.backup_dir();
        fs::create_dir_all(&backup_dir)?;
        let name = format!("{}_{TASKS_KEY}.json", now.format("%Y-%m-%d_%H-%M-%S"));
        let dest = backup_dir.join(name);
        fs::copy(&slot, &dest)?;
        Ok(Some(dest))
    }
}
