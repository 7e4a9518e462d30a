use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::duration::{format_duration, parse_duration};
use crate::error::Result;
use crate::models::Task;
use crate::prompt::Prompter;
use crate::selection::choose;
use crate::storage::Storage;
use crate::store::{SortKey, TaskStore};
use crate::tracking::{self, Clock, Confirmation, Countdown, NEW_TASK_PROMPT};

/// Picks or creates a task, works it for `duration`, then asks whether it is done.
pub fn cmd_todo<S: Storage>(
    store: &TaskStore<S>,
    duration: &str,
    clock: &impl Clock,
    countdown: &mut impl Countdown,
    prompter: &mut impl Prompter,
) -> Result<()> {
    if let Some((session, confirmation)) = tracking::work(store, duration, clock, countdown, prompter)? {
        if confirmation == Confirmation::Completed {
            prompter.show(&format!("Task {} marked as complete.", session.id));
        }
    }
    Ok(())
}

/// Adds a task, asking for its text when none was given.
pub fn cmd_new<S: Storage>(
    store: &TaskStore<S>,
    text: Option<String>,
    prompter: &mut impl Prompter,
) -> Result<i64> {
    let text = match text {
        Some(t) => t,
        None => prompter.ask(NEW_TASK_PROMPT)?,
    };
    let id = store.append(text.trim())?;
    prompter.show(&format!("Task added (id = {})", id));
    Ok(id)
}

/// Deletes a task, letting the user pick from every task when no id was given.
pub fn cmd_delete<S: Storage>(
    store: &TaskStore<S>,
    id: Option<i64>,
    prompter: &mut impl Prompter,
) -> Result<Option<i64>> {
    let id = match id {
        Some(id) => Some(id),
        None => choose(&store.all()?, "Input task number to delete: ", prompter)?,
    };
    match id {
        Some(id) => {
            let deleted = store.delete(id)?;
            prompter.show(&format!("Deleted task id={}: \"{}\".", id, deleted.task));
            Ok(Some(id))
        }
        None => {
            prompter.show("No task deleted.");
            Ok(None)
        }
    }
}

/// Marks a task complete, letting the user pick from open tasks when no id was given.
pub fn cmd_complete<S: Storage>(
    store: &TaskStore<S>,
    id: Option<i64>,
    prompter: &mut impl Prompter,
) -> Result<Option<i64>> {
    let id = match id {
        Some(id) => Some(id),
        None => choose(&store.todo()?, "Input task number to complete: ", prompter)?,
    };
    match id {
        Some(id) => {
            store.complete(id)?;
            prompter.show(&format!("Task {} marked as complete.", id));
            Ok(Some(id))
        }
        None => {
            prompter.show("No task completed.");
            Ok(None)
        }
    }
}

/// Lists every task ordered by `sort`.
pub fn cmd_list<S: Storage>(
    store: &TaskStore<S>,
    sort: SortKey,
    descending: bool,
    prompter: &mut impl Prompter,
) -> Result<()> {
    let tasks = store.sorted(sort, descending)?;
    if tasks.is_empty() {
        prompter.show("No tasks found.");
        return Ok(());
    }
    prompter.show(&list_table(&tasks).to_string());
    Ok(())
}

/// Runs a bare countdown that is not tied to any task.
pub fn cmd_countdown(duration: &str, title: Option<String>, countdown: &mut impl Countdown) -> Result<()> {
    let d = parse_duration(duration)?;
    countdown.run(d, title.as_deref().unwrap_or(""))
}

fn list_table(tasks: &[Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Created").add_attribute(Attribute::Bold),
            Cell::new("Worked").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let status = if t.completed { "Done" } else { "Pending" };
        let status_color = if t.completed { Color::Green } else { Color::Yellow };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.task),
            Cell::new(t.created.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(t.worked.map(format_duration).unwrap_or_else(|| "-".into())),
            Cell::new(status).fg(status_color),
        ]);
    }
    table
}
