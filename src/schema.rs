//! Fixed logical schema of the task collection.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Task;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Int64,
    String,
    Bool,
    /// Microseconds since the Unix epoch, local wall-clock time.
    TimestampUs,
    /// Signed microseconds.
    DurationUs,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Int64 => "int64",
            DataType::String => "string",
            DataType::Bool => "bool",
            DataType::TimestampUs => "timestamp(us)",
            DataType::DurationUs => "duration(us)",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub dtype: DataType,
}

impl Column {
    fn new(name: &str, dtype: DataType) -> Self {
        Column { name: name.to_string(), dtype }
    }
}

pub const ID: &str = "id";
pub const TASK: &str = "task";
pub const COMPLETED: &str = "completed";
pub const CREATED: &str = "created";
pub const WORKED: &str = "worked";

/// Columns every file generation carries.
pub fn required_columns() -> Vec<Column> {
    vec![
        Column::new(ID, DataType::Int64),
        Column::new(TASK, DataType::String),
        Column::new(COMPLETED, DataType::Bool),
        Column::new(CREATED, DataType::TimestampUs),
    ]
}

/// The full current schema, including the nullable `worked` column.
pub fn current() -> Vec<Column> {
    let mut cols = required_columns();
    cols.push(Column::new(WORKED, DataType::DurationUs));
    cols
}

/// Checks a declared schema against the fixed one.
///
/// The older generation without `worked` is accepted; anything else must match exactly.
pub fn check(declared: &[Column]) -> Result<()> {
    if declared == current().as_slice() || declared == required_columns().as_slice() {
        return Ok(());
    }
    Err(Error::Schema(format!(
        "expected [{}], found [{}]",
        describe(&current()),
        describe(declared)
    )))
}

fn describe(cols: &[Column]) -> String {
    cols.iter()
        .map(|c| format!("{}:{}", c.name, c.dtype))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fails with `DataCorruption` on the first id seen twice.
pub fn check_unique_ids(tasks: &[Task]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for t in tasks {
        if !seen.insert(t.id) {
            return Err(Error::DataCorruption(format!("id {} is not unique", t.id)));
        }
    }
    Ok(())
}
