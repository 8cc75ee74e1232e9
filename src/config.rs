//! Runtime configuration: where the data directory lives.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "MILISTA_DIR";
const DEFAULT_DIR_NAME: &str = ".milista";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolve the data directory: explicit flag, then `$MILISTA_DIR`, then
    /// `$HOME/.milista` (or `./.milista` without a home).
    pub fn resolve(flag: Option<&Path>) -> Self {
        let env = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::from_sources(flag, env, home)
    }

    fn from_sources(flag: Option<&Path>, env: Option<PathBuf>, home: Option<PathBuf>) -> Self {
        let data_dir = flag
            .map(Path::to_path_buf)
            .or(env.filter(|p| !p.as_os_str().is_empty()))
            .unwrap_or_else(|| {
                home.unwrap_or_else(|| PathBuf::from("."))
                    .join(DEFAULT_DIR_NAME)
            });
        Config { data_dir }
    }

    /// Create the data directory if needed.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }

    /// Directory receiving pre-import backups.
    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join("backup")
    }
}
