//! Enumerations for TUI state management.

use crate::task::TaskId;

/// Which screen has the keyboard.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    TaskDetail,
    AddTask,
    ImportPath,
    Help,
    Confirm,
    /// A message that must be acknowledged before continuing.
    Notice,
}

/// A destructive action waiting for a y/n answer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConfirmAction {
    DeleteTask { id: TaskId, title: String },
    ClearDone(usize),
}

impl ConfirmAction {
    pub fn describe(&self) -> String {
        match self {
            ConfirmAction::DeleteTask { title, .. } => format!("Delete task '{title}'"),
            ConfirmAction::ClearDone(n) => format!("Delete {n} completed task(s)"),
        }
    }
}
