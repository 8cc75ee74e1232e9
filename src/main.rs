//! # Milista - personal to-do list manager
//!
//! A single-user task list with a dashboard-style terminal user interface
//! and a scriptable command line.
//!
//! ## Key Features
//!
//! - **Tasks with metadata**: description, due date, priority, category and tags
//! - **Active / Completed sections**: toggle a task to move it between them
//! - **Search, filter and sort**: by text, category, priority, creation, due date or priority
//! - **At-a-glance stats**: totals, completion rate, due today and overdue counts
//! - **JSON export/import**: import appends and never replaces the current list
//! - **Light and dark themes**: the preference is remembered
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the dashboard
//! milista
//!
//! # Add a task from the shell
//! milista add "Buy groceries" --due tomorrow --priority high --category Shopping --tag food
//!
//! # Show what is left, most urgent first
//! milista list --sort priority
//! ```
//!
//! Data is stored in `~/.milista/` (override with `--data-dir` or `MILISTA_DIR`):
//! `todo-tasks.json` holds the task list and `dark-mode.json` the theme.
//! Every change is written immediately.

use std::process;

use clap::Parser;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

pub mod cli;
pub mod clock;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fields;
pub mod repository;
pub mod session;
pub mod stats;
pub mod store;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use clock::SystemClock;
use cmd::*;
use config::Config;
use session::Session;
use view::ViewQuery;

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ui);

    if should_install_tracing(&command) {
        install_tracing();
    }

    let config = Config::resolve(cli.data_dir.as_deref());
    let mut session = Session::open(config);
    let clock = SystemClock;

    let result = match command {
        Commands::Ui => cmd_ui(&mut session, &clock),

        Commands::Add { title, desc, due, priority, category, tags } =>
            cmd_add(&mut session, &clock, title, desc, due, priority, category, tags),

        Commands::List { search, category, priority, sort, completed, all, limit } => {
            let query = ViewQuery { search: search.unwrap_or_default(), category, priority, sort };
            cmd_list(&session, &clock, query, completed, all, limit)
        }

        Commands::View { id } => cmd_view(&session, &clock, id),

        Commands::Toggle { id } => cmd_toggle(&mut session, &clock, id),

        Commands::Delete { id } => cmd_delete(&mut session, id),

        Commands::CompleteAll => cmd_complete_all(&mut session, &clock),

        Commands::ClearDone => cmd_clear_done(&mut session),

        Commands::Stats => cmd_stats(&session, &clock),

        Commands::Categories => cmd_categories(&session),

        Commands::Export { output } => cmd_export(&session, &clock, output),

        Commands::Import { input, no_backup } => cmd_import(&mut session, &clock, input, no_backup),

        Commands::Theme { mode } => cmd_theme(&mut session, mode),

        Commands::Completions { shell } => cmd_completions(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// The terminal UI owns the screen, so log lines would corrupt it.
const fn should_install_tracing(cmd: &Commands) -> bool {
    !matches!(cmd, Commands::Ui)
}

fn install_tracing() {
    // RUST_LOG overrides; warnings and errors only by default.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_ui() {
        let cli = Cli::try_parse_from(["milista"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!should_install_tracing(&cli.command.unwrap_or(Commands::Ui)));
    }

    #[test]
    fn test_data_dir_flag_is_global() {
        let cli = Cli::try_parse_from(["milista", "stats", "--data-dir", "/tmp/x"]).unwrap();
        assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/x")));
        assert!(should_install_tracing(cli.command.as_ref().unwrap()));
    }

    #[test]
    fn test_list_flags_parse() {
        let cli = Cli::try_parse_from([
            "milista", "list", "--category", "Work", "--priority", "high", "--sort", "due-date",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::List { category, priority, sort, .. }) => {
                assert_eq!(category, fields::Selector::Only("Work".to_string()));
                assert_eq!(priority, fields::Selector::Only(fields::Priority::High));
                assert_eq!(sort, fields::SortMode::DueDate);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_completed_conflicts_with_all() {
        assert!(Cli::try_parse_from(["milista", "list", "--completed", "--all"]).is_err());
    }
}
