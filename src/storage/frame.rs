//! Native on-disk format: a columnar JSON document.
//!
//! ```json
//! {
//!   "schema": [{"name": "id", "type": "int64"}, ...],
//!   "columns": {"id": [0, 1], "task": ["a", "b"], ...}
//! }
//! ```
//!
//! Timestamps and durations are stored as integer microseconds.

use chrono::{DateTime, Duration};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Task;
use crate::schema::{self, Column};

#[derive(Serialize, Deserialize, Debug)]
struct Frame {
    schema: Vec<Column>,
    columns: Columns,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct Columns {
    id: Vec<i64>,
    task: Vec<String>,
    completed: Vec<bool>,
    created: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    worked: Option<Vec<Option<i64>>>,
}

impl Frame {
    /// Fails when a `worked` value does not fit in i64 microseconds.
    fn from_tasks(tasks: &[Task]) -> Result<Frame> {
        let mut sorted: Vec<&Task> = tasks.iter().collect();
        sorted.sort_by_key(|t| t.id);

        let mut columns = Columns {
            worked: Some(Vec::with_capacity(sorted.len())),
            ..Columns::default()
        };
        for t in sorted {
            columns.id.push(t.id);
            columns.task.push(t.task.clone());
            columns.completed.push(t.completed);
            columns.created.push(t.created.and_utc().timestamp_micros());
            let worked = match t.worked {
                Some(d) => Some(d.num_microseconds().ok_or_else(|| {
                    Error::Schema(format!(
                        "task {}: worked duration does not fit in {}",
                        t.id,
                        schema::DataType::DurationUs
                    ))
                })?),
                None => None,
            };
            if let Some(w) = columns.worked.as_mut() {
                w.push(worked);
            }
        }
        Ok(Frame {
            schema: schema::current(),
            columns,
        })
    }

    /// Declared schema matches the fixed one, the optional column agrees with the
    /// declaration, and every column has the same length.
    fn validate(&self) -> Result<()> {
        schema::check(&self.schema)?;

        let declares_worked = self.schema.iter().any(|c| c.name == schema::WORKED);
        if declares_worked != self.columns.worked.is_some() {
            return Err(Error::Schema(format!(
                "column '{}' {} but the schema {}",
                schema::WORKED,
                if self.columns.worked.is_some() { "is present" } else { "is missing" },
                if declares_worked { "declares it" } else { "does not declare it" },
            )));
        }

        let c = &self.columns;
        let n = c.id.len();
        let mut lengths = vec![
            (schema::TASK, c.task.len()),
            (schema::COMPLETED, c.completed.len()),
            (schema::CREATED, c.created.len()),
        ];
        if let Some(w) = &c.worked {
            lengths.push((schema::WORKED, w.len()));
        }
        for (name, len) in lengths {
            if len != n {
                return Err(Error::Schema(format!(
                    "column '{}' has {} rows, expected {}",
                    name, len, n
                )));
            }
        }
        Ok(())
    }

    fn into_tasks(self) -> Result<Vec<Task>> {
        let Columns {
            id,
            task,
            completed,
            created,
            worked,
        } = self.columns;
        let mut worked = worked.map(|w| w.into_iter());

        let mut tasks = Vec::with_capacity(id.len());
        for (((id, task), completed), created) in id.into_iter().zip(task).zip(completed).zip(created) {
            let created = DateTime::from_timestamp_micros(created)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| Error::Schema(format!("task {}: created timestamp out of range", id)))?;
            let worked = worked
                .as_mut()
                .and_then(|w| w.next())
                .flatten()
                .map(Duration::microseconds);
            tasks.push(Task {
                id,
                task,
                completed,
                created,
                worked,
            });
        }
        Ok(tasks)
    }
}

/// Parses a native store file, enforcing the schema and id uniqueness.
pub fn decode(bytes: &[u8]) -> Result<Vec<Task>> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let frame: Frame =
        serde_json::from_value(value).map_err(|e| Error::Schema(e.to_string()))?;
    frame.validate()?;
    let tasks = frame.into_tasks()?;
    schema::check_unique_ids(&tasks)?;
    Ok(tasks)
}

/// Serializes the collection sorted by id.
pub fn encode(tasks: &[Task]) -> Result<Vec<u8>> {
    schema::check_unique_ids(tasks)?;
    let frame = Frame::from_tasks(tasks)?;
    frame.validate()?;
    Ok(serde_json::to_vec_pretty(&frame)?)
}
