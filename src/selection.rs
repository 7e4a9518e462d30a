//! Picking a task by its position in a freshly rendered view.
//!
//! Positions are display-only: they are recomputed from the view on every call
//! and translated to the durable task id before anything else sees them.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::duration::format_duration;
use crate::error::{Error, Result};
use crate::models::Task;
use crate::prompt::Prompter;

/// Resolves a typed position to a task id.
///
/// Empty or non-numeric input means "no selection" (`Ok(None)`).
pub fn resolve_choice(view: &[Task], token: &str) -> Result<Option<i64>> {
    if view.is_empty() {
        return Err(Error::EmptyView);
    }
    let token = token.trim();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return Ok(None);
    }
    let index = token.parse::<usize>().unwrap_or(usize::MAX);
    view.get(index)
        .map(|t| Some(t.id))
        .ok_or(Error::OutOfRange {
            index,
            len: view.len(),
        })
}

/// Table of the view with a leading selection index column.
pub fn render_view(view: &[Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Created").add_attribute(Attribute::Bold),
            Cell::new("Worked").add_attribute(Attribute::Bold),
            Cell::new("Done").add_attribute(Attribute::Bold),
        ]);

    for (index, t) in view.iter().enumerate() {
        let worked = t.worked.map(format_duration).unwrap_or_else(|| "-".into());
        table.add_row(vec![
            Cell::new(index),
            Cell::new(t.id),
            Cell::new(&t.task),
            Cell::new(t.created.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(worked),
            Cell::new(if t.completed { "✅" } else { "❌" })
                .fg(if t.completed { Color::Green } else { Color::Reset }),
        ]);
    }
    table
}

/// Shows the view, asks for a position and resolves it.
pub fn choose(view: &[Task], prompt: &str, prompter: &mut impl Prompter) -> Result<Option<i64>> {
    if view.is_empty() {
        return Err(Error::EmptyView);
    }
    prompter.show(&render_view(view).to_string());
    let answer = prompter.ask(prompt)?;
    resolve_choice(view, &answer)
}
