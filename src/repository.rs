//! The task repository: sole owner of the task list.
//!
//! Every mutation takes the current time from the caller so the repository
//! itself holds no clock. The list serializes as a bare JSON array, which is
//! the format of both the storage slot and export files.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fields::DEFAULT_CATEGORY;
use crate::task::{NewTask, Task, TaskId};

/// Outcome of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    /// Imported tasks whose id collided and was replaced.
    pub reassigned: usize,
}

/// In-memory task list in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRepository {
    tasks: Vec<Task>,
}

impl TaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by ID.
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Append a new task. Returns `None` without touching the list when the
    /// title is blank.
    pub fn add(&mut self, new: NewTask, now: DateTime<Utc>) -> Option<&Task> {
        let title = new.title.trim();
        if title.is_empty() {
            debug!("rejected task with empty title");
            return None;
        }
        let description = new
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let category = new
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let mut id = TaskId::generate();
        while self.get(&id).is_some() {
            id = TaskId::generate();
        }

        let task = Task {
            id,
            title: title.to_string(),
            description,
            due_date: new.due_date,
            priority: new.priority,
            category,
            completed: false,
            created_at: now,
            completed_at: None,
            tags: new.tags,
        };
        debug!(id = %task.id, title = %task.title, "task added");
        self.tasks.push(task);
        self.tasks.last()
    }

    /// Flip completion. Returns the new state, or `None` if `id` is unknown.
    pub fn toggle_complete(&mut self, id: &TaskId, now: DateTime<Utc>) -> Option<bool> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        debug!(id = %task.id, completed = task.completed, "task toggled");
        Some(task.completed)
    }

    /// Remove a task. Returns whether anything was removed.
    pub fn delete(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            debug!(id = %id, "task deleted");
        }
        removed
    }

    /// Complete every open task. Already completed tasks keep their stamp.
    pub fn complete_all(&mut self, now: DateTime<Utc>) -> usize {
        let mut changed = 0;
        for task in self.tasks.iter_mut().filter(|t| !t.completed) {
            task.completed = true;
            task.completed_at = Some(now);
            changed += 1;
        }
        debug!(changed, "completed all tasks");
        changed
    }

    /// Drop every completed task, returning how many were removed.
    pub fn delete_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        debug!(removed, "cleared completed tasks");
        removed
    }

    /// Pretty-printed JSON array of the whole list.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.tasks)?)
    }

    /// Parse `text` as a task array and append it. Nothing is added unless
    /// the whole document is valid.
    pub fn import_json(&mut self, text: &str) -> Result<ImportReport> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let serde_json::Value::Array(items) = value else {
            return Err(Error::NotAnArray);
        };
        let mut incoming = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let task: Task = serde_json::from_value(item).map_err(|e| Error::InvalidTask {
                index,
                reason: e.to_string(),
            })?;
            incoming.push(task);
        }
        self.import(incoming)
    }

    /// Append already-parsed tasks after validating all of them. Ids that
    /// collide with existing tasks, or with earlier tasks in the batch, are
    /// replaced with fresh ones.
    pub fn import(&mut self, incoming: Vec<Task>) -> Result<ImportReport> {
        for (index, task) in incoming.iter().enumerate() {
            task.validate()
                .map_err(|reason| Error::InvalidTask { index, reason })?;
        }

        let mut seen: HashSet<TaskId> = self.tasks.iter().map(|t| t.id.clone()).collect();
        let mut reassigned = 0;
        let added = incoming.len();
        for mut task in incoming {
            if seen.contains(&task.id) {
                let mut fresh = TaskId::generate();
                while seen.contains(&fresh) {
                    fresh = TaskId::generate();
                }
                debug!(old = %task.id, new = %fresh, "reassigned duplicate id on import");
                task.id = fresh;
                reassigned += 1;
            }
            seen.insert(task.id.clone());
            self.tasks.push(task);
        }
        info!(added, reassigned, "imported tasks");
        Ok(ImportReport { added, reassigned })
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tasks
            .iter()
            .filter(|t| seen.insert(t.category.as_str()))
            .map(|t| t.category.clone())
            .collect()
    }

    /// Resolve a full id, a unique id prefix, or an exact (case-insensitive)
    /// title to a task id. An input that is a prefix of one task's id and the
    /// title of another is ambiguous.
    pub fn resolve(&self, identifier: &str) -> Result<TaskId> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(Error::TaskNotFound(identifier.to_string()));
        }
        if let Some(task) = self.tasks.iter().find(|t| t.id.as_str() == identifier) {
            return Ok(task.id.clone());
        }

        // Id prefixes and titles compete on equal terms; a task counts once.
        let wanted = identifier.to_lowercase();
        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.id.as_str().starts_with(identifier) || t.title.to_lowercase() == wanted)
            .collect();

        match matches.as_slice() {
            [] => Err(Error::TaskNotFound(identifier.to_string())),
            [one] => Ok(one.id.clone()),
            many => Err(Error::AmbiguousTask {
                identifier: identifier.to_string(),
                candidates: many
                    .iter()
                    .map(|t| format!("  {}  {}", t.id, t.title))
                    .collect::<Vec<_>>()
                    .join("\n"),
            }),
        }
    }
}
