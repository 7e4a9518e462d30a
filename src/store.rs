//! The task store: every operation reads the whole collection, transforms it in
//! memory and, for mutations, writes the whole collection back under the store lock.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Field, FieldUpdate, Task, Value};
use crate::storage::Storage;

/// Column to order the full listing by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    Id,
    Task,
    Completed,
    Created,
    Worked,
}

pub struct TaskStore<S: Storage> {
    storage: S,
}

impl<S: Storage> TaskStore<S> {
    pub fn new(storage: S) -> Self {
        TaskStore { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Every record, newest first.
    pub fn all(&self) -> Result<Vec<Task>> {
        let mut tasks = self.storage.load()?;
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    /// Open tasks, newest first.
    pub fn todo(&self) -> Result<Vec<Task>> {
        let mut tasks = self.all()?;
        tasks.retain(|t| !t.completed);
        Ok(tasks)
    }

    /// Completed tasks, newest first.
    pub fn done(&self) -> Result<Vec<Task>> {
        let mut tasks = self.all()?;
        tasks.retain(|t| t.completed);
        Ok(tasks)
    }

    /// Every record ordered by `key`. Equal keys fall back to id order.
    pub fn sorted(&self, key: SortKey, descending: bool) -> Result<Vec<Task>> {
        let mut tasks = self.storage.load()?;
        tasks.sort_by(|a, b| {
            let ord = compare_by(key, a, b).then(a.id.cmp(&b.id));
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        Ok(tasks)
    }

    /// Adds an open task and returns its id: one past the largest id, or 0 when empty.
    pub fn append(&self, text: &str) -> Result<i64> {
        if text.is_empty() {
            return Err(Error::Validation("Task cannot be empty.".into()));
        }
        let _guard = self.storage.lock()?;
        let mut tasks = self.storage.load()?;
        let new_id = tasks.iter().map(|t| t.id).max().map_or(0, |max| max + 1);
        tasks.push(Task::new(new_id, text));
        self.storage.save(&tasks)?;
        info!(id = new_id, "task appended");
        Ok(new_id)
    }

    /// Removes a task and returns the removed record.
    pub fn delete(&self, id: i64) -> Result<Task> {
        let _guard = self.storage.lock()?;
        let mut tasks = self.storage.load()?;
        let pos = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::NotFound(id))?;
        let removed = tasks.remove(pos);
        self.storage.save(&tasks)?;
        info!(id, "task deleted");
        Ok(removed)
    }

    /// Replaces one column of one record, leaving every other value untouched.
    pub fn set_field(&self, id: i64, update: FieldUpdate) -> Result<()> {
        if let FieldUpdate::Task(text) = &update {
            if text.is_empty() {
                return Err(Error::Validation("Task cannot be empty.".into()));
            }
        }
        let _guard = self.storage.lock()?;
        let mut tasks = self.storage.load()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound(id))?;
        debug!(id, ?update, "setting field");
        task.apply(update);
        self.storage.save(&tasks)
    }

    pub fn complete(&self, id: i64) -> Result<()> {
        self.set_field(id, FieldUpdate::Completed(true))
    }

    pub fn reopen(&self, id: i64) -> Result<()> {
        self.set_field(id, FieldUpdate::Completed(false))
    }

    pub fn get_row(&self, id: i64) -> Result<Task> {
        self.storage
            .load()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// A single value; a missing `worked` entry reads as `Value::Null`.
    pub fn get(&self, id: i64, field: Field) -> Result<Value> {
        Ok(self.get_row(id)?.get(field))
    }
}

fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
}

fn compare_by(key: SortKey, a: &Task, b: &Task) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Task => a.task.cmp(&b.task),
        SortKey::Completed => a.completed.cmp(&b.completed),
        SortKey::Created => a.created.cmp(&b.created),
        SortKey::Worked => a.worked.cmp(&b.worked),
    }
}
