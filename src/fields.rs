//! Enumerations and field types for task management.
//!
//! This module defines the structured values used to classify tasks and to
//! drive list views: priorities, sort modes, list sections, and the generic
//! `Selector` used by the category and priority filters.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Category given to a task when none is supplied.
pub const DEFAULT_CATEGORY: &str = "Personal";

/// Categories offered as suggestions. Any other string is equally valid.
pub const SUGGESTED_CATEGORIES: [&str; 5] = ["Personal", "Work", "Shopping", "Health", "Learning"];

/// How important a task is.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Severity used for ordering: high=3, medium=2, low=1.
    pub fn weight(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{other}' (expected low, medium or high)")),
        }
    }
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum SortMode {
    /// Newest first.
    #[default]
    Created,
    /// Earliest due date first, undated tasks last.
    DueDate,
    /// High before medium before low.
    Priority,
}

impl SortMode {
    pub fn label(self) -> &'static str {
        match self {
            SortMode::Created => "Created",
            SortMode::DueDate => "Due Date",
            SortMode::Priority => "Priority",
        }
    }

    /// The next mode in display order, wrapping around.
    pub fn next(self) -> SortMode {
        match self {
            SortMode::Created => SortMode::DueDate,
            SortMode::DueDate => SortMode::Priority,
            SortMode::Priority => SortMode::Created,
        }
    }
}

/// Which half of the list is being looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Active,
    Completed,
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Section::Active => "Active Tasks",
            Section::Completed => "Completed Tasks",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            Section::Active => "No active tasks. Time to add some goals!",
            Section::Completed => "No completed tasks yet.",
        }
    }

    pub fn contains(self, completed: bool) -> bool {
        match self {
            Section::Active => !completed,
            Section::Completed => completed,
        }
    }

    pub fn toggle(self) -> Section {
        match self {
            Section::Active => Section::Completed,
            Section::Completed => Section::Active,
        }
    }
}

/// A filter that is either open ("all") or pinned to one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => wanted == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str("all"),
            Selector::Only(v) => v.fmt(f),
        }
    }
}

impl<T: FromStr> FromStr for Selector<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Selector::All)
        } else {
            s.parse().map(Selector::Only)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_priority_weights_order_by_severity() {
        assert!(Priority::High.weight() > Priority::Medium.weight());
        assert!(Priority::Medium.weight() > Priority::Low.weight());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        let p: Priority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(p, Priority::Low);
        assert!(serde_json::from_str::<Priority>("\"urgent\"").is_err());
    }

    #[rstest]
    #[case("all", Selector::All)]
    #[case("ALL", Selector::Only("ALL".to_string()))]
    #[case("All", Selector::Only("All".to_string()))]
    #[case("Work", Selector::Only("Work".to_string()))]
    #[case("work", Selector::Only("work".to_string()))]
    fn test_category_selector_parse(#[case] input: &str, #[case] expected: Selector<String>) {
        assert_eq!(input.parse::<Selector<String>>().unwrap(), expected);
    }

    #[test]
    fn test_priority_selector_parse_and_match() {
        let sel: Selector<Priority> = "high".parse().unwrap();
        assert!(sel.matches(&Priority::High));
        assert!(!sel.matches(&Priority::Low));
        assert!(Selector::<Priority>::All.matches(&Priority::Low));
        assert!("extreme".parse::<Selector<Priority>>().is_err());
    }

    #[test]
    fn test_sort_mode_cycle_returns_to_start() {
        let start = SortMode::default();
        assert_eq!(start.next().next().next(), start);
    }
}
