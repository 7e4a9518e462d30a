//! Whole-collection persistence.
//!
//! Every load reads the full record set and every save replaces the full file.
//! The native store is a columnar JSON file (see [`frame`]); an older CSV store next
//! to it is migrated on first load.

mod frame;
mod legacy;
mod lock;

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::Task;
use crate::schema;

pub use frame::{decode, encode};
pub use lock::{write_atomic, FileLock, LockKind, DEFAULT_LOCK_TIMEOUT_MS};

/// Backing store for the task collection.
pub trait Storage {
    /// Held across a load+mutate+save cycle.
    type Guard;

    fn lock(&self) -> Result<Self::Guard>;

    /// Reads every record. A store that does not exist yet is empty.
    fn load(&self) -> Result<Vec<Task>>;

    /// Replaces the stored collection with `tasks`.
    fn save(&self, tasks: &[Task]) -> Result<()>;
}

/// Which files are on disk.
enum Layout {
    Native,
    Legacy(PathBuf),
    Both(PathBuf),
    Empty,
}

/// Single-file store on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage {
            path: path.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        FileStorage {
            path: config.db_path.clone(),
            lock_timeout_ms: config.lock_timeout_ms,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the older CSV store, if it can differ from the native one.
    pub fn legacy_path(&self) -> Option<PathBuf> {
        let legacy = self.path.with_extension("csv");
        (legacy != self.path).then_some(legacy)
    }

    fn layout(&self) -> Layout {
        let legacy = self.legacy_path().filter(|p| p.exists());
        match (self.path.exists(), legacy) {
            (true, Some(legacy)) => Layout::Both(legacy),
            (true, None) => Layout::Native,
            (false, Some(legacy)) => Layout::Legacy(legacy),
            (false, None) => Layout::Empty,
        }
    }

    fn read_native(&self) -> Result<Vec<Task>> {
        let tasks = decode(&fs::read(&self.path)?)?;
        debug!(path = %self.path.display(), records = tasks.len(), "store loaded");
        Ok(tasks)
    }

    /// Decides what to do about a legacy file under the migration lock. A migration
    /// in progress briefly leaves both files on disk, so "both present" is only
    /// trusted once the lock is held.
    fn migrate_exclusive(&self) -> Result<Vec<Task>> {
        let _guard = FileLock::acquire(&self.path, LockKind::Migration, self.lock_timeout_ms)?;
        match self.layout() {
            Layout::Legacy(legacy) => self.migrate(&legacy),
            Layout::Both(legacy) => Err(Error::AmbiguousStorage {
                legacy,
                native: self.path.clone(),
            }),
            Layout::Native => self.read_native(),
            Layout::Empty => Ok(Vec::new()),
        }
    }

    /// Converts the legacy file into the native one, then moves the legacy file
    /// aside so the two never coexist.
    fn migrate(&self, legacy: &Path) -> Result<Vec<Task>> {
        info!(from = %legacy.display(), to = %self.path.display(), "migrating legacy store");
        let tasks = legacy::read(legacy)?;
        self.save(&tasks)?;

        let migrated = decode(&fs::read(&self.path)?)?;
        if migrated.len() != tasks.len() {
            return Err(Error::DataCorruption(format!(
                "migration wrote {} of {} records",
                migrated.len(),
                tasks.len()
            )));
        }

        let mut aside = legacy.as_os_str().to_owned();
        aside.push(".migrated");
        fs::rename(legacy, PathBuf::from(aside))?;
        info!(records = migrated.len(), "legacy store migrated");
        Ok(migrated)
    }
}

impl Storage for FileStorage {
    type Guard = FileLock;

    fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(&self.path, LockKind::Update, self.lock_timeout_ms)
    }

    fn load(&self) -> Result<Vec<Task>> {
        match self.layout() {
            Layout::Native => self.read_native(),
            Layout::Legacy(_) | Layout::Both(_) => self.migrate_exclusive(),
            Layout::Empty => {
                debug!(path = %self.path.display(), "no store yet");
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        let bytes = encode(tasks)?;
        write_atomic(&self.path, &bytes)?;
        debug!(path = %self.path.display(), records = tasks.len(), "store saved");
        Ok(())
    }
}

/// In-process store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tasks: RefCell<Vec<Task>>,
    saves: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        MemoryStorage {
            tasks: RefCell::new(tasks),
            saves: Cell::new(0),
        }
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl Storage for MemoryStorage {
    type Guard = ();

    fn lock(&self) -> Result<()> {
        Ok(())
    }

    fn load(&self) -> Result<Vec<Task>> {
        let tasks = self.tasks.borrow().clone();
        schema::check_unique_ids(&tasks)?;
        Ok(tasks)
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        schema::check_unique_ids(tasks)?;
        let mut sorted = tasks.to_vec();
        sorted.sort_by_key(|t| t.id);
        *self.tasks.borrow_mut() = sorted;
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().join("tasks.json"));
        assert!(storage.load().expect("load").is_empty());
        assert!(!storage.path().exists());
    }

    #[test]
    fn save_then_load_is_sorted_by_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().join("tasks.json"));
        storage
            .save(&[Task::new(2, "c"), Task::new(0, "a"), Task::new(1, "b")])
            .expect("save");
        let ids: Vec<i64> = storage.load().expect("load").iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn legacy_file_is_migrated_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let native = dir.path().join("tasks.json");
        let legacy = dir.path().join("tasks.csv");
        fs::write(
            &legacy,
            "id,task,completed,created\n0,a,false,2024-03-01T09:15:00.000001\n1,b,true,2024-03-01T09:16:00.000000\n",
        )
        .expect("write csv");

        let storage = FileStorage::new(&native);
        let tasks = storage.load().expect("migrate");
        assert_eq!(tasks.len(), 2);
        assert!(native.exists());
        assert!(!legacy.exists());
        assert!(dir.path().join("tasks.csv.migrated").exists());

        assert_eq!(storage.load().expect("reload"), tasks);
    }

    #[test]
    fn concurrent_first_loads_migrate_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let native = dir.path().join("tasks.json");
        fs::write(
            dir.path().join("tasks.csv"),
            "id,task,completed,created\n0,a,false,2024-03-01T09:15:00.000001\n1,b,true,2024-03-01T09:16:00.000000\n",
        )
        .expect("write csv");

        let results: Vec<Result<Vec<Task>>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let storage = FileStorage::new(&native);
                    s.spawn(move || storage.load())
                })
                .collect();
            handles.into_iter().map(|h| h.join().expect("join")).collect()
        });

        for result in results {
            let tasks = result.expect("every loader sees the migrated store");
            assert_eq!(tasks.len(), 2);
        }
        assert!(native.exists());
        assert!(!dir.path().join("tasks.csv").exists());
        assert!(dir.path().join("tasks.csv.migrated").exists());
    }

    #[test]
    fn migration_waits_for_a_held_migration_lock() {
        let dir = tempfile::tempdir().expect("tempdir");
        let native = dir.path().join("tasks.json");
        fs::write(dir.path().join("tasks.csv"), "id,task,completed,created\n").expect("write csv");

        let mut storage = FileStorage::new(&native);
        storage.lock_timeout_ms = 100;
        let held = FileLock::acquire(&native, LockKind::Migration, 100).expect("hold");
        assert!(matches!(storage.load(), Err(Error::LockFailed(_))));
        assert!(!native.exists());

        drop(held);
        assert!(storage.load().expect("migrate").is_empty());
        assert!(native.exists());
    }

    #[test]
    fn both_formats_present_is_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let native = dir.path().join("tasks.json");
        let storage = FileStorage::new(&native);
        storage.save(&[Task::new(0, "a")]).expect("save");
        fs::write(dir.path().join("tasks.csv"), "id,task,completed,created\n").expect("write csv");

        let err = storage.load().unwrap_err();
        assert!(matches!(err, Error::AmbiguousStorage { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn memory_storage_rejects_duplicate_ids() {
        let storage = MemoryStorage::new();
        let err = storage.save(&[Task::new(1, "a"), Task::new(1, "b")]).unwrap_err();
        assert!(matches!(err, Error::DataCorruption(_)));
        assert_eq!(storage.saves(), 0);
    }
}
