use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Personal to-do list manager.
/// Data lives in ~/.milista unless --data-dir or MILISTA_DIR says otherwise.
#[derive(Parser)]
#[command(name = "milista", version, about = "Personal to-do list manager")]
pub struct Cli {
    /// Directory holding the task list and preferences.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Defaults to `ui` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
