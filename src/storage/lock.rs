//! Advisory locks next to the store file, and whole-file replacement.
//!
//! Two lock files sit beside `tasks.json`:
//! - `tasks.json.lock` guards a load+mutate+save cycle.
//! - `tasks.json.migrate.lock` guards the one-time legacy conversion, which can run
//!   from inside a locked cycle or from a plain read.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

const RETRY_EVERY: Duration = Duration::from_millis(50);

/// Which lock beside the store file to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    Update,
    Migration,
}

impl LockKind {
    fn suffix(self) -> &'static str {
        match self {
            LockKind::Update => "lock",
            LockKind::Migration => "migrate.lock",
        }
    }

    /// `<store>.<suffix>`
    pub fn path_for(self, store: &Path) -> PathBuf {
        let mut p = store.as_os_str().to_owned();
        p.push(".");
        p.push(self.suffix());
        PathBuf::from(p)
    }
}

/// Exclusive lock on one of the store's lock files; released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Takes the `kind` lock for `store`, retrying until `timeout_ms` has passed.
    pub fn acquire(store: &Path, kind: LockKind, timeout_ms: u64) -> Result<Self> {
        let path = kind.path_for(store);
        create_parent(&path)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!(path = %path.display(), "lock acquired");
                    return Ok(FileLock { file });
                }
                Err(e) if !held_elsewhere(&e) => return Err(Error::Io(e)),
                Err(_) if Instant::now() >= deadline => return Err(Error::LockFailed(path)),
                Err(_) => {
                    trace!(path = %path.display(), "lock busy, retrying");
                    std::thread::sleep(RETRY_EVERY);
                }
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn held_elsewhere(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Replaces `path` with `data`: written to `.<name>.<pid>.tmp` in the same directory,
/// synced, then renamed over the target.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    create_parent(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()));

    let mut temp = File::create(&temp_path)?;
    temp.write_all(data)?;
    temp.sync_all()?;
    drop(temp);

    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_files_sit_beside_the_store() {
        let store = Path::new("/data/tasker/tasks.json");
        assert_eq!(
            LockKind::Update.path_for(store),
            PathBuf::from("/data/tasker/tasks.json.lock")
        );
        assert_eq!(
            LockKind::Migration.path_for(store),
            PathBuf::from("/data/tasker/tasks.json.migrate.lock")
        );
    }

    #[test]
    fn second_update_lock_times_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = dir.path().join("tasks.json");
        let held = FileLock::acquire(&store, LockKind::Update, 100).expect("first lock");
        match FileLock::acquire(&store, LockKind::Update, 100) {
            Err(Error::LockFailed(p)) => assert_eq!(p, dir.path().join("tasks.json.lock")),
            other => panic!("expected LockFailed, got {:?}", other),
        }
        drop(held);
        assert!(FileLock::acquire(&store, LockKind::Update, 100).is_ok());
    }

    #[test]
    fn update_and_migration_locks_are_independent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = dir.path().join("tasks.json");
        let _update = FileLock::acquire(&store, LockKind::Update, 100).expect("update lock");
        assert!(FileLock::acquire(&store, LockKind::Migration, 100).is_ok());
    }

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("tasks.json");
        write_atomic(&path, b"first").expect("write");
        write_atomic(&path, b"second").expect("rewrite");
        assert_eq!(fs::read(&path).expect("read"), b"second");
        let leftovers: Vec<_> = fs::read_dir(path.parent().expect("parent"))
            .expect("read_dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
