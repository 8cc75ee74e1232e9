//! The "add task" form of the terminal user interface.
//!
//! Text fields are edited in place; priority and category are selectors
//! cycled with the arrow keys. Category also accepts free text.

use chrono::NaiveDate;

use crate::clock::parse_due_input;
use crate::cmd::split_tags;
use crate::fields::{Priority, DEFAULT_CATEGORY, SUGGESTED_CATEGORIES};
use crate::task::NewTask;
use crate::tui::input::InputField;

pub const TITLE_FIELD: usize = 0;
pub const DESCRIPTION_FIELD: usize = 1;
pub const DUE_FIELD: usize = 2;
pub const PRIORITY_FIELD: usize = 3;
pub const CATEGORY_FIELD: usize = 4;
pub const TAGS_FIELD: usize = 5;
pub const FIELD_COUNT: usize = 6;

pub const FIELD_LABELS: [&str; FIELD_COUNT] =
    ["Title", "Description", "Due date", "Priority", "Category", "Tags"];

pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub priority: Priority,
    pub category: InputField,
    pub tags: InputField,
    pub current_field: usize,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            priority: Priority::Medium,
            category: InputField::with_value(DEFAULT_CATEGORY),
            tags: InputField::new(),
            current_field: TITLE_FIELD,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// The text field with focus, if the focused field is free text.
    pub fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_FIELD => Some(&mut self.title),
            DESCRIPTION_FIELD => Some(&mut self.description),
            DUE_FIELD => Some(&mut self.due),
            CATEGORY_FIELD => Some(&mut self.category),
            TAGS_FIELD => Some(&mut self.tags),
            _ => None,
        }
    }

    /// Step the focused selector. Returns false if the field is not one.
    pub fn cycle(&mut self, forward: bool) -> bool {
        match self.current_field {
            PRIORITY_FIELD => {
                let all = [Priority::Low, Priority::Medium, Priority::High];
                let idx = all.iter().position(|p| *p == self.priority).unwrap_or(1);
                let next = if forward { (idx + 1) % 3 } else { (idx + 2) % 3 };
                self.priority = all[next];
                true
            }
            CATEGORY_FIELD => {
                let n = SUGGESTED_CATEGORIES.len();
                let idx = SUGGESTED_CATEGORIES
                    .iter()
                    .position(|c| *c == self.category.value.trim());
                let next = match (idx, forward) {
                    (Some(i), true) => (i + 1) % n,
                    (Some(i), false) => (i + n - 1) % n,
                    (None, true) => 0,
                    (None, false) => n - 1,
                };
                self.category = InputField::with_value(SUGGESTED_CATEGORIES[next]);
                true
            }
            _ => false,
        }
    }

    /// Display text for a field.
    pub fn field_value(&self, field: usize) -> String {
        let input = match field {
            TITLE_FIELD => &self.title,
            DESCRIPTION_FIELD => &self.description,
            DUE_FIELD => &self.due,
            CATEGORY_FIELD => &self.category,
            TAGS_FIELD => &self.tags,
            _ => return format!("< {} >", self.priority.as_str().to_uppercase()),
        };
        if field == self.current_field {
            input.display_with_cursor()
        } else {
            input.value.clone()
        }
    }

    /// Build the task input, or explain what is wrong with the form.
    pub fn to_new_task(&self, today: NaiveDate) -> Result<NewTask, String> {
        if self.title.value.trim().is_empty() {
            return Err("Title is required".into());
        }
        let due_date = match self.due.value.trim() {
            "" => None,
            raw => Some(parse_due_input(raw, today).ok_or_else(|| format!("Unrecognised due date '{raw}'"))?),
        };
        let description = Some(self.description.value.clone()).filter(|d| !d.trim().is_empty());
        Ok(NewTask {
            title: self.title.value.clone(),
            description,
            due_date,
            priority: self.priority,
            category: Some(self.category.value.clone()),
            tags: split_tags(&[self.tags.value.clone()]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_defaults_match_new_task_defaults() {
        let mut form = TaskForm::new();
        form.title = InputField::with_value("Plan trip");
        let new = form.to_new_task(today()).unwrap();
        assert_eq!(new.priority, Priority::Medium);
        assert_eq!(new.category.as_deref(), Some("Personal"));
        assert!(new.tags.is_empty());
        assert_eq!(new.description, None);
        assert_eq!(new.due_date, None);
    }

    #[test]
    fn test_blank_title_and_bad_date_are_reported() {
        let mut form = TaskForm::new();
        assert!(form.to_new_task(today()).is_err());
        form.title = InputField::with_value("x");
        form.due = InputField::with_value("whenever");
        assert!(form.to_new_task(today()).unwrap_err().contains("whenever"));
        form.due = InputField::with_value("tomorrow");
        assert_eq!(form.to_new_task(today()).unwrap().due_date, NaiveDate::from_ymd_opt(2024, 6, 16));
    }

    #[test]
    fn test_huge_offset_is_reported_not_accepted() {
        let mut form = TaskForm::new();
        form.title = InputField::with_value("x");
        form.due = InputField::with_value("in 99999999d");
        assert!(form.to_new_task(today()).unwrap_err().contains("99999999"));
    }

    #[test]
    fn test_tags_are_split_on_commas() {
        let mut form = TaskForm::new();
        form.title = InputField::with_value("x");
        form.tags = InputField::with_value("a, b,,a");
        assert_eq!(form.to_new_task(today()).unwrap().tags, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_selectors_cycle_and_wrap() {
        let mut form = TaskForm::new();
        assert!(!form.cycle(true));
        form.current_field = PRIORITY_FIELD;
        assert!(form.cycle(true));
        assert_eq!(form.priority, Priority::High);
        form.cycle(true);
        assert_eq!(form.priority, Priority::Low);

        form.current_field = CATEGORY_FIELD;
        form.cycle(false);
        assert_eq!(form.category.value, "Learning");
        form.category = InputField::with_value("Garden");
        form.cycle(true);
        assert_eq!(form.category.value, "Personal");
    }

    #[test]
    fn test_field_focus_wraps() {
        let mut form = TaskForm::new();
        form.prev_field();
        assert_eq!(form.current_field, TAGS_FIELD);
        form.next_field();
        assert_eq!(form.current_field, TITLE_FIELD);
        assert!(form.active_input().is_some());
        form.current_field = PRIORITY_FIELD;
        assert!(form.active_input().is_none());
    }
}
