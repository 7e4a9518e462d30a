use std::fmt;

use chrono::{Duration, Local, NaiveDateTime, SubsecRound};

/// Represents a single task in the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier, never reused after deletion.
    pub id: i64,
    /// The task description. Never empty.
    pub task: String,
    /// Whether the task has been completed.
    pub completed: bool,
    /// Local creation time, microsecond precision.
    pub created: NaiveDateTime,
    /// Accumulated work time. `None` for rows written before the column existed.
    pub worked: Option<Duration>,
}

impl Task {
    /// Creates a fresh, open task stamped with the current local time.
    pub fn new(id: i64, task: impl Into<String>) -> Self {
        Task {
            id,
            task: task.into(),
            completed: false,
            created: now_micros(),
            worked: Some(Duration::zero()),
        }
    }

    /// Accumulated work time with a missing value read as zero.
    pub fn worked_or_zero(&self) -> Duration {
        self.worked.unwrap_or_else(Duration::zero)
    }

    pub fn get(&self, field: Field) -> Value {
        match field {
            Field::Id => Value::Int(self.id),
            Field::Task => Value::Text(self.task.clone()),
            Field::Completed => Value::Bool(self.completed),
            Field::Created => Value::Timestamp(self.created),
            Field::Worked => match self.worked {
                Some(d) => Value::Duration(d),
                None => Value::Null,
            },
        }
    }

    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Completed(c) => self.completed = c,
            FieldUpdate::Worked(d) => self.worked = Some(d),
            FieldUpdate::Task(t) => self.task = t,
        }
    }
}

/// Current local time truncated to the precision the store keeps.
pub fn now_micros() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

/// Readable columns of a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Task,
    Completed,
    Created,
    Worked,
}

/// A single cell read out of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Duration(Duration),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Duration(d) => write!(f, "{}", crate::duration::format_duration(*d)),
            Value::Null => write!(f, "null"),
        }
    }
}

/// The mutable columns of a task record, one variant per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Completed(bool),
    Worked(Duration),
    Task(String),
}
