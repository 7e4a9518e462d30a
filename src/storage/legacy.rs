//! Reader for the older row-oriented CSV store.
//!
//! Header: `id,task,completed,created[,worked]`. `created` is an ISO-8601 local
//! timestamp, `worked` integer microseconds or empty.

use std::path::Path;

use chrono::{Duration, NaiveDateTime, SubsecRound};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Task;
use crate::schema;

#[derive(Deserialize, Debug)]
struct LegacyRow {
    id: i64,
    task: String,
    completed: bool,
    created: String,
    #[serde(default)]
    worked: Option<i64>,
}

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
        .map(|t| t.trunc_subsecs(6))
}

fn check_header(path: &Path, header: &csv::StringRecord) -> Result<()> {
    let names: Vec<&str> = header.iter().collect();
    let accepted = [schema::required_columns(), schema::current()];
    if accepted
        .iter()
        .any(|cols| cols.iter().map(|c| c.name.as_str()).eq(names.iter().copied()))
    {
        return Ok(());
    }
    Err(Error::Schema(format!(
        "{}: unexpected header [{}]",
        path.display(),
        names.join(",")
    )))
}

/// Reads every row of a legacy CSV file.
pub fn read(path: &Path) -> Result<Vec<Task>> {
    let mut rdr = csv::ReaderBuilder::new().from_path(path)?;
    let header = rdr.headers()?.clone();
    check_header(path, &header)?;

    let mut tasks = Vec::new();
    for row in rdr.deserialize::<LegacyRow>() {
        let row = row.map_err(|e| Error::Schema(format!("{}: {}", path.display(), e)))?;
        let created = parse_timestamp(&row.created).ok_or_else(|| {
            Error::Schema(format!(
                "{}: task {} has unreadable created timestamp '{}'",
                path.display(),
                row.id,
                row.created
            ))
        })?;
        tasks.push(Task {
            id: row.id,
            task: row.task,
            completed: row.completed,
            created,
            worked: row.worked.map(Duration::microseconds),
        });
    }
    schema::check_unique_ids(&tasks)?;
    Ok(tasks)
}
