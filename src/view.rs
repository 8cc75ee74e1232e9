//! Filtered, searched and sorted projections of the task list.
//!
//! Views borrow from the list and never reorder it; the same query over the
//! same list always yields the same sequence.

use std::cmp::Ordering;

use crate::fields::{Priority, Section, Selector, SortMode};
use crate::task::Task;

/// Parameters of a list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub search: String,
    pub category: Selector<String>,
    pub priority: Selector<Priority>,
    pub sort: SortMode,
}

impl ViewQuery {
    /// Filter and sort `tasks`, returning references in display order.
    pub fn apply<'a, I>(&self, tasks: I) -> Vec<&'a Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let needle = self.search.to_lowercase();
        let mut out: Vec<&Task> = tasks
            .into_iter()
            .filter(|t| t.matches_search(&needle))
            .filter(|t| self.category.matches(&t.category))
            .filter(|t| self.priority.matches(&t.priority))
            .collect();
        // Vec::sort_by is stable.
        out.sort_by(|a, b| compare(self.sort, a, b));
        out
    }

    /// Apply the query to one section of the list.
    pub fn apply_section<'a>(&self, tasks: &'a [Task], section: Section) -> Vec<&'a Task> {
        self.apply(tasks.iter().filter(|t| section.contains(t.completed)))
    }

    /// Whether any narrowing is in effect.
    pub fn is_filtered(&self) -> bool {
        !self.search.is_empty()
            || self.category != Selector::All
            || self.priority != Selector::All
    }
}

/// Ordering for one sort mode.
pub fn compare(mode: SortMode, a: &Task, b: &Task) -> Ordering {
    match mode {
        SortMode::Created => b.created_at.cmp(&a.created_at),
        SortMode::DueDate => match (a.due_date, b.due_date) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => x.cmp(&y),
        },
        SortMode::Priority => b.priority.weight().cmp(&a.priority.weight()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn task(title: &str, hour: u32, due: Option<&str>, priority: Priority, category: &str) -> Task {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
        Task {
            id: TaskId::from(title),
            title: title.into(),
            description: None,
            due_date: due.map(|d| d.parse().unwrap()),
            priority,
            category: category.into(),
            completed: false,
            created_at: created,
            completed_at: None,
            tags: vec![],
        }
    }

    fn fixture() -> Vec<Task> {
        let mut tagged = task("gym", 3, Some("2024-06-10"), Priority::Low, "Health");
        tagged.tags = vec!["Cardio".into()];
        let mut described = task("report", 4, None, Priority::High, "Work");
        described.description = Some("Quarterly NUMBERS".into());
        vec![
            task("milk", 1, Some("2024-06-20"), Priority::Medium, "Shopping"),
            task("email", 2, None, Priority::High, "Work"),
            tagged,
            described,
        ]
    }

    fn titles(view: &[&Task]) -> Vec<String> {
        view.iter().map(|t| t.title.clone()).collect()
    }

    #[rstest]
    #[case(SortMode::Created, &["report", "gym", "email", "milk"])]
    #[case(SortMode::DueDate, &["gym", "milk", "email", "report"])]
    #[case(SortMode::Priority, &["email", "report", "milk", "gym"])]
    fn test_sort_modes(#[case] sort: SortMode, #[case] expected: &[&str]) {
        let tasks = fixture();
        let query = ViewQuery { sort, ..ViewQuery::default() };
        assert_eq!(titles(&query.apply(&tasks)), expected);
    }

    #[test]
    fn test_sorting_does_not_touch_source_order() {
        let tasks = fixture();
        let before = tasks.clone();
        let query = ViewQuery { sort: SortMode::Priority, ..ViewQuery::default() };
        let _ = query.apply(&tasks);
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_undated_always_after_dated() {
        let tasks = vec![
            task("none", 1, None, Priority::High, "Work"),
            task("far", 2, Some("2999-01-01"), Priority::Low, "Work"),
            task("near", 3, Some("1999-01-01"), Priority::Low, "Work"),
        ];
        let query = ViewQuery { sort: SortMode::DueDate, ..ViewQuery::default() };
        assert_eq!(titles(&query.apply(&tasks)), vec!["near", "far", "none"]);
    }

    #[rstest]
    #[case("MILK", &["milk"])]
    #[case("numbers", &["report"])]
    #[case("cardio", &["gym"])]
    #[case("", &["report", "gym", "email", "milk"])]
    #[case("nothing", &[])]
    #[case(" ", &["report"])]
    #[case(" milk", &[])]
    fn test_search(#[case] term: &str, #[case] expected: &[&str]) {
        let tasks = fixture();
        let query = ViewQuery { search: term.into(), ..ViewQuery::default() };
        assert_eq!(titles(&query.apply(&tasks)), expected);
    }

    #[test]
    fn test_category_filter_is_case_sensitive() {
        let tasks = fixture();
        let mut query = ViewQuery { category: Selector::Only("Work".into()), ..ViewQuery::default() };
        assert_eq!(titles(&query.apply(&tasks)), vec!["report", "email"]);
        query.category = Selector::Only("work".into());
        assert!(query.apply(&tasks).is_empty());
    }

    #[test]
    fn test_filters_combine() {
        let tasks = fixture();
        let query = ViewQuery {
            search: "e".into(),
            category: Selector::Only("Work".into()),
            priority: Selector::Only(Priority::High),
            sort: SortMode::Created,
        };
        assert_eq!(titles(&query.apply(&tasks)), vec!["report", "email"]);
        assert!(query.is_filtered());
        assert!(!ViewQuery::default().is_filtered());
    }

    #[test]
    fn test_view_is_deterministic() {
        let tasks = fixture();
        let query = ViewQuery { sort: SortMode::DueDate, ..ViewQuery::default() };
        let first: Vec<*const Task> = query.apply(&tasks).into_iter().map(|t| t as *const Task).collect();
        let second: Vec<*const Task> = query.apply(&tasks).into_iter().map(|t| t as *const Task).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sections_split_on_completion() {
        let mut tasks = fixture();
        tasks[0].completed = true;
        tasks[0].completed_at = Some(tasks[0].created_at);
        let query = ViewQuery::default();
        assert_eq!(titles(&query.apply_section(&tasks, Section::Completed)), vec!["milk"]);
        assert_eq!(query.apply_section(&tasks, Section::Active).len(), 3);
    }
}
