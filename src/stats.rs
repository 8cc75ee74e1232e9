//! Aggregate counts derived from the task list.

use chrono::NaiveDate;

use crate::task::Task;

/// Where a task's due date falls relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    /// Open and due before today.
    Overdue,
    /// Open and due today.
    Today,
    /// Open and due after today.
    Upcoming,
    /// Completed, or no due date.
    None,
}

impl DueState {
    pub fn of(task: &Task, today: NaiveDate) -> DueState {
        match task.due_date {
            _ if task.completed => DueState::None,
            None => DueState::None,
            Some(d) if d < today => DueState::Overdue,
            Some(d) if d == today => DueState::Today,
            Some(_) => DueState::Upcoming,
        }
    }
}

/// Counts shown in the dashboard. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
    pub due_today: usize,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], today: NaiveDate) -> TaskStats {
        tasks.iter().fold(TaskStats::default(), |mut acc, task| {
            acc.total += 1;
            if task.completed {
                acc.completed += 1;
            }
            match DueState::of(task, today) {
                DueState::Overdue => acc.overdue += 1,
                DueState::Today => acc.due_today += 1,
                DueState::Upcoming | DueState::None => {}
            }
            acc
        })
    }

    pub fn active(&self) -> usize {
        self.total - self.completed
    }

    /// Percentage of tasks completed, 0 for an empty list.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use crate::task::TaskId;
    use chrono::{TimeZone, Utc};

    fn task(due: Option<&str>, completed: bool) -> Task {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Task {
            id: TaskId::generate(),
            title: "t".into(),
            description: None,
            due_date: due.map(|d| d.parse().unwrap()),
            priority: Priority::Medium,
            category: "Personal".into(),
            completed,
            created_at: created,
            completed_at: completed.then_some(created),
            tags: vec![],
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_january_task_is_overdue_in_june() {
        let tasks = vec![task(Some("2024-01-01"), false), task(Some("2024-12-31"), false)];
        let stats = TaskStats::compute(&tasks, day("2024-06-15"));
        assert_eq!(stats.total, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.due_today, 0);
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let tasks = vec![task(Some("2024-06-15"), false), task(Some("2024-06-14"), false)];
        let stats = TaskStats::compute(&tasks, day("2024-06-15"));
        assert_eq!(stats.due_today, 1);
        assert_eq!(stats.overdue, 1);
    }

    #[test]
    fn test_completed_and_undated_tasks_are_never_late() {
        let tasks = vec![
            task(Some("2024-01-01"), true),
            task(Some("2024-06-15"), true),
            task(None, false),
        ];
        let stats = TaskStats::compute(&tasks, day("2024-06-15"));
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.due_today, 0);
        assert_eq!(stats.active(), 1);
    }

    #[test]
    fn test_completion_rate() {
        assert_eq!(TaskStats::default().completion_rate(), 0.0);
        let tasks = vec![task(None, true), task(None, false), task(None, false), task(None, true)];
        let stats = TaskStats::compute(&tasks, day("2024-06-15"));
        assert_eq!(stats.completion_rate(), 50.0);
    }

    #[test]
    fn test_due_state_classification() {
        let today = day("2024-06-15");
        assert_eq!(DueState::of(&task(Some("2024-06-16"), false), today), DueState::Upcoming);
        assert_eq!(DueState::of(&task(Some("2024-06-15"), false), today), DueState::Today);
        assert_eq!(DueState::of(&task(Some("2024-06-01"), false), today), DueState::Overdue);
        assert_eq!(DueState::of(&task(Some("2024-06-01"), true), today), DueState::None);
    }
}
