//! Command implementations for the CLI interface.
//!
//! Each handler drives the `Session` and prints a short, human-oriented
//! report. Handlers return errors to `main`, which prints them and exits
//! non-zero.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing::debug;

use crate::clock::{
    export_file_name, format_clock, format_due_relative, format_long_date, format_stamp, greeting,
    parse_due_input, Clock,
};
use crate::error::{Error, Result};
use crate::fields::{Priority, Section, Selector, SortMode, SUGGESTED_CATEGORIES};
use crate::session::Session;
use crate::stats::DueState;
use crate::task::{NewTask, Task};
use crate::tui::run::run_tui;
use crate::view::ViewQuery;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive terminal UI.
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", a weekday, or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Category (Personal, Work, Shopping, Health, Learning, or anything else).
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated tags. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List tasks with optional search, filters and sorting.
    List {
        /// Case-insensitive text matched against title, description and tags.
        #[arg(long, short)]
        search: Option<String>,
        /// Category to show, or "all" (lowercase; "All" selects a category of that name).
        #[arg(long, default_value = "all")]
        category: Selector<String>,
        /// Priority to show (low | medium | high), or "all".
        #[arg(long, default_value = "all")]
        priority: Selector<Priority>,
        /// Sort order.
        #[arg(long, value_enum, default_value_t = SortMode::Created)]
        sort: SortMode,
        /// Show the completed section instead of active tasks.
        #[arg(long, conflicts_with = "all")]
        completed: bool,
        /// Show both sections.
        #[arg(long)]
        all: bool,
        /// Limit number of rows printed per section.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show every field of one task.
    View {
        /// Task id, unique id prefix, or exact title.
        id: String,
    },

    /// Flip a task between open and completed.
    Toggle {
        /// Task id, unique id prefix, or exact title.
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task id, unique id prefix, or exact title.
        id: String,
    },

    /// Mark every open task completed.
    CompleteAll,

    /// Delete every completed task.
    ClearDone,

    /// Show totals, completion rate, and what is due.
    Stats,

    /// List the categories in use, with counts.
    Categories,

    /// Export all tasks as a JSON array.
    Export {
        /// Output path, or "-" for stdout (default: todo-tasks-<date>.json).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Append tasks from a JSON export.
    Import {
        /// JSON file produced by `export`.
        input: PathBuf,
        /// Skip backing up the current list first.
        #[arg(long)]
        no_backup: bool,
    },

    /// Show or change the display theme.
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
    Light,
    Dark,
    Toggle,
}

/// Launch the terminal user interface.
pub fn cmd_ui(session: &mut Session, clock: &dyn Clock) -> Result<()> {
    run_tui(session, clock)?;
    Ok(())
}

/// Split comma-separated tag arguments. Order and duplicates are kept.
pub fn split_tags(inputs: &[String]) -> Vec<String> {
    inputs
        .iter()
        .flat_map(|raw| raw.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Add a new task.
pub fn cmd_add(
    session: &mut Session,
    clock: &dyn Clock,
    title: String,
    desc: Option<String>,
    due: Option<String>,
    priority: Priority,
    category: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let due_date = match due {
        Some(raw) => Some(parse_due_input(&raw, clock.today()).ok_or(Error::InvalidDate(raw))?),
        None => None,
    };
    let new = NewTask {
        title,
        description: desc,
        due_date,
        priority,
        category,
        tags: split_tags(&tags),
    };
    match session.add(new, clock.now_utc()) {
        Some(id) => println!("Added task {}", id.short()),
        None => println!("Nothing added: the title is empty."),
    }
    Ok(())
}

/// List tasks with filtering and sorting.
pub fn cmd_list(
    session: &Session,
    clock: &dyn Clock,
    query: ViewQuery,
    completed: bool,
    all: bool,
    limit: Option<usize>,
) -> Result<()> {
    let sections: &[Section] = if all {
        &[Section::Active, Section::Completed]
    } else if completed {
        &[Section::Completed]
    } else {
        &[Section::Active]
    };
    debug!(?query, "listing tasks");

    let today = clock.today();
    for (i, &section) in sections.iter().enumerate() {
        let mut rows = query.apply_section(session.tasks(), section);
        if i > 0 {
            println!();
        }
        println!("{} ({})", section.title(), rows.len());
        if rows.is_empty() {
            println!("  {}", section.empty_message());
            if !query.search.is_empty() {
                println!("  No tasks match your search for \"{}\"", query.search);
            }
            continue;
        }
        if let Some(n) = limit {
            rows.truncate(n);
        }
        print_table(&rows, today);
    }
    Ok(())
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], today: chrono::NaiveDate) {
    println!(
        "{:<9} {:<4} {:<7} {:<10} {:<12} {}",
        "ID", "Done", "Pri", "Due", "Category", "Title [tags]"
    );
    for t in tasks {
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(
                " [{}]",
                t.tags.iter().map(|tag| format!("#{tag}")).collect::<Vec<_>>().join(" ")
            )
        };
        let mut due = format_due_relative(t.due_date, today);
        if DueState::of(t, today) == DueState::Overdue {
            due.push('!');
        }
        println!(
            "{:<9} {:<4} {:<7} {:<10} {:<12} {}{}",
            t.id.short(),
            if t.completed { "[x]" } else { "[ ]" },
            t.priority.as_str(),
            due,
            truncate(&t.category, 12),
            t.title,
            tags
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// View detailed information about a specific task.
pub fn cmd_view(session: &Session, clock: &dyn Clock, id: String) -> Result<()> {
    let task_id = session.repo().resolve(&id)?;
    let task = session.repo().get(&task_id).ok_or(Error::TaskNotFound(id))?;
    let today = clock.today();

    let due = match task.due_date {
        Some(d) => {
            let note = match DueState::of(task, today) {
                DueState::Overdue => " - Overdue",
                DueState::Today => " - Today",
                DueState::Upcoming | DueState::None => "",
            };
            format!("{d} ({}){note}", format_due_relative(Some(d), today))
        }
        None => "-".into(),
    };
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", if task.completed { "Completed" } else { "Active" });
    println!("Priority:     {}", task.priority.as_str().to_uppercase());
    println!("Category:     {}", task.category);
    println!("Due:          {due}");
    println!(
        "Tags:         {}",
        if task.tags.is_empty() { "-".into() } else { task.tags.join(", ") }
    );
    println!("Created:      {}", format_stamp(&task.created_at));
    if let Some(done) = &task.completed_at {
        println!("Completed:    {}", format_stamp(done));
    }
    println!("Description:\n{}", task.description.as_deref().unwrap_or("-"));
    Ok(())
}

/// Flip completion of a task.
pub fn cmd_toggle(session: &mut Session, clock: &dyn Clock, id: String) -> Result<()> {
    let task_id = session.repo().resolve(&id)?;
    match session.toggle_complete(&task_id, clock.now_utc()) {
        Some(true) => println!("Completed {}", task_id.short()),
        Some(false) => println!("Reopened {}", task_id.short()),
        None => return Err(Error::TaskNotFound(id)),
    }
    Ok(())
}

/// Delete a task.
pub fn cmd_delete(session: &mut Session, id: String) -> Result<()> {
    let task_id = session.repo().resolve(&id)?;
    if !session.delete(&task_id) {
        return Err(Error::TaskNotFound(id));
    }
    println!("Deleted {}", task_id.short());
    Ok(())
}

pub fn cmd_complete_all(session: &mut Session, clock: &dyn Clock) -> Result<()> {
    let n = session.complete_all(clock.now_utc());
    println!("Completed {n} task(s).");
    Ok(())
}

pub fn cmd_clear_done(session: &mut Session) -> Result<()> {
    let n = session.delete_completed();
    println!("Deleted {n} completed task(s).");
    Ok(())
}

/// Print the dashboard: greeting, clock and counts.
pub fn cmd_stats(session: &Session, clock: &dyn Clock) -> Result<()> {
    let now = clock.now();
    let stats = session.stats(now.date_naive());
    println!("{}! Let's be productive today", greeting(&now));
    println!("{}  {}", format_long_date(&now), format_clock(&now));
    println!();
    println!("{:<11} {}", "Total", stats.total);
    println!("{:<11} {}", "Active", stats.active());
    println!(
        "{:<11} {}  ({:.0}% complete)",
        "Completed",
        stats.completed,
        stats.completion_rate()
    );
    println!("{:<11} {}", "Due Today", stats.due_today);
    println!("{:<11} {}", "Overdue", stats.overdue);
    Ok(())
}

/// List categories in use, then unused suggestions.
pub fn cmd_categories(session: &Session) -> Result<()> {
    let used = session.repo().categories();
    println!("{:<16} Count", "Category");
    for cat in &used {
        let count = session.tasks().iter().filter(|t| &t.category == cat).count();
        println!("{:<16} {}", truncate(cat, 16), count);
    }
    let unused: Vec<&str> = SUGGESTED_CATEGORIES
        .iter()
        .copied()
        .filter(|s| !used.iter().any(|u| u == s))
        .collect();
    if !unused.is_empty() {
        println!("\nSuggestions: {}", unused.join(", "));
    }
    Ok(())
}

/// Export tasks to a JSON file or stdout.
pub fn cmd_export(session: &Session, clock: &dyn Clock, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(clock.today())));
    if path.as_os_str() == "-" {
        let json = session.export_json()?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        writeln!(stdout)?;
        return Ok(());
    }
    let n = session.export_to(&path)?;
    println!("Exported {n} task(s) to {}", path.display());
    Ok(())
}

/// Import tasks from a JSON export, backing up first unless told not to.
pub fn cmd_import(session: &mut Session, clock: &dyn Clock, input: PathBuf, no_backup: bool) -> Result<()> {
    let report = session.import_file(&input, !no_backup, clock.now())?;
    println!("Imported {} task(s).", report.added);
    if report.reassigned > 0 {
        println!("{} task(s) had ids already in use and were given new ones.", report.reassigned);
    }
    Ok(())
}

/// Show or change the theme preference.
pub fn cmd_theme(session: &mut Session, mode: Option<ThemeMode>) -> Result<()> {
    match mode {
        Some(ThemeMode::Light) => session.set_dark_mode(false),
        Some(ThemeMode::Dark) => session.set_dark_mode(true),
        Some(ThemeMode::Toggle) => {
            session.toggle_dark_mode();
        }
        None => {}
    }
    println!("Theme: {}", if session.dark_mode() { "dark" } else { "light" });
    Ok(())
}

/// Generate shell completions.
pub fn cmd_completions(shell: Shell) -> Result<()> {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    generate(shell, &mut cmd, "milista", &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags_keeps_order_and_duplicates() {
        let raw = vec!["home, urgent".to_string(), " ,home".to_string(), "x".to_string()];
        assert_eq!(split_tags(&raw), vec!["home", "urgent", "home", "x"]);
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> chrono::DateTime<chrono::Local> {
            use chrono::TimeZone;
            chrono::Local.with_ymd_and_hms(2024, 6, 15, 14, 0, 0).unwrap()
        }
    }

    fn session(dir: &std::path::Path) -> Session {
        Session::open(crate::config::Config { data_dir: dir.to_path_buf() })
    }

    #[test]
    fn test_add_parses_due_and_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        cmd_add(&mut s, &FixedClock, "Pay rent".into(), None, Some("in 2d".into()), Priority::High, None, vec![])
            .unwrap();
        assert_eq!(s.tasks()[0].due_date, chrono::NaiveDate::from_ymd_opt(2024, 6, 17));
        assert_eq!(s.tasks()[0].category, "Personal");

        let err = cmd_add(&mut s, &FixedClock, "x".into(), None, Some("someday".into()), Priority::Low, None, vec![])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDate(ref d) if d == "someday"));
        assert_eq!(s.tasks().len(), 1);
    }

    #[test]
    fn test_toggle_and_delete_resolve_by_title() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        cmd_add(&mut s, &FixedClock, "Call mom".into(), None, None, Priority::Medium, None, vec![]).unwrap();

        cmd_toggle(&mut s, &FixedClock, "call mom".into()).unwrap();
        assert!(s.tasks()[0].completed);
        assert!(cmd_delete(&mut s, "nobody".into()).is_err());
        cmd_delete(&mut s, "Call mom".into()).unwrap();
        assert!(s.tasks().is_empty());
    }

    #[test]
    fn test_export_then_import_appends() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        cmd_add(&mut s, &FixedClock, "One".into(), None, None, Priority::Medium, None, vec![]).unwrap();
        let out = dir.path().join("out.json");
        cmd_export(&s, &FixedClock, Some(out.clone())).unwrap();

        cmd_import(&mut s, &FixedClock, out, true).unwrap();
        assert_eq!(s.tasks().len(), 2);
        assert_ne!(s.tasks()[0].id, s.tasks()[1].id);
    }

    #[test]
    fn test_theme_toggle_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        cmd_theme(&mut s, Some(ThemeMode::Toggle)).unwrap();
        assert!(session(dir.path()).dark_mode());
        cmd_theme(&mut s, Some(ThemeMode::Light)).unwrap();
        assert!(!session(dir.path()).dark_mode());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Shopping", 12), "Shopping");
        assert_eq!(truncate("Extraordinarily", 6), "Extra…");
    }
}
