use std::path::PathBuf;

use crate::storage::DEFAULT_LOCK_TIMEOUT_MS;

/// Environment variable overriding the store location.
pub const DB_ENV: &str = "TASKER_DB";

/// Runtime settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Native store file. The legacy CSV file sits next to it.
    pub db_path: PathBuf,
    pub lock_timeout_ms: u64,
}

impl Config {
    /// Builds a config, taking the store path from (in order) `db`, `TASKER_DB`,
    /// the platform data directory, or `./tasks.json`.
    pub fn resolve(db: Option<PathBuf>) -> Config {
        let db_path = db
            .or_else(|| std::env::var_os(DB_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(default_db_path);
        Config {
            db_path,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

/// `~/.local/share/tasker/tasks.json` on Linux, the equivalent elsewhere.
pub fn default_db_path() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("tasker");
    p.push("tasks.json");
    p
}
