//! Work sessions: pick a task, reserve the expected time, run the countdown,
//! reconcile against the time that actually passed, then ask whether the task is done.
//!
//! The expected duration is written to `worked` *before* the countdown starts, so a
//! crash mid-session leaves an over-count rather than nothing. Once the countdown
//! returns (finished, interrupted or failed) the reservation is corrected with the
//! same `expected` value, which leaves `worked == before + actual`.

use chrono::{DateTime, Duration, Local, SubsecRound};
use tracing::{info, warn};

use crate::duration::{format_duration, parse_duration};
use crate::error::{Error, Result};
use crate::models::FieldUpdate;
use crate::prompt::Prompter;
use crate::selection::choose;
use crate::storage::Storage;
use crate::store::TaskStore;

/// Wall-clock source for measuring sessions.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Local time truncated to microseconds, the precision the store keeps.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now().trunc_subsecs(6)
    }
}

/// Blocks for up to `duration`, returning early if the user interrupts.
pub trait Countdown {
    fn run(&mut self, duration: Duration, title: &str) -> Result<()>;
}

/// Outcome of one timed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSession {
    pub id: i64,
    pub expected: Duration,
    pub actual: Duration,
    pub worked_before: Duration,
    pub worked: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Completed,
    LeftOpen,
    /// Anything other than `y`/`n`; nothing was changed.
    Invalid(String),
}

const CONTINUE_PROMPT: &str =
    "Input a number to continue the task, or press enter to make new task: ";
const CREATE_PROMPT: &str =
    "No outstanding tasks found. Would you like to make a new task? (y/n): ";
pub const NEW_TASK_PROMPT: &str = "What would you like to complete this hour?: ";
const CONFIRM_PROMPT: &str = "Task complete? (y/n): ";

/// Chooses the task to work on, creating one when asked.
///
/// Returns `None` when the user declines to create a task.
pub fn pick_task<S: Storage>(store: &TaskStore<S>, prompter: &mut impl Prompter) -> Result<Option<i64>> {
    let todo = store.todo()?;
    if !todo.is_empty() {
        prompter.show("There are tasks outstanding.");
        return match choose(&todo, CONTINUE_PROMPT, prompter)? {
            Some(id) => Ok(Some(id)),
            None => ask_new(store, prompter).map(Some),
        };
    }

    let answer = prompter.ask(CREATE_PROMPT)?;
    match answer.trim() {
        "y" => ask_new(store, prompter).map(Some),
        "n" => {
            prompter.show("Exiting.");
            Ok(None)
        }
        other => {
            warn!(input = other, "unrecognised answer to create prompt");
            prompter.show("Invalid input.");
            Ok(None)
        }
    }
}

fn ask_new<S: Storage>(store: &TaskStore<S>, prompter: &mut impl Prompter) -> Result<i64> {
    let text = prompter.ask(NEW_TASK_PROMPT)?;
    store.append(text.trim())
}

/// Reserves `duration` against the task, runs the countdown and reconciles.
///
/// The correction is written even when the countdown fails; its error is returned
/// afterwards.
pub fn start_work<S: Storage>(
    store: &TaskStore<S>,
    id: i64,
    duration: &str,
    clock: &impl Clock,
    countdown: &mut impl Countdown,
) -> Result<WorkSession> {
    let expected = parse_duration(duration)?;
    let task = store.get_row(id)?;
    let worked_before = task.worked_or_zero();

    let reserved = worked_before
        .checked_add(&expected)
        .filter(|d| d.num_microseconds().is_some())
        .ok_or_else(|| {
            Error::Validation(format!(
                "Task {} cannot take another {}: total work time would overflow.",
                id,
                format_duration(expected)
            ))
        })?;
    store.set_field(id, FieldUpdate::Worked(reserved))?;
    info!(id, reserved = %format_duration(reserved), "time reserved");

    let start = clock.now();
    let outcome = countdown.run(expected, &task.task);
    let actual = clock.now() - start;

    // Not clamped: an overrun countdown makes this negative and adds time.
    let not_worked = expected - actual;
    let worked = reserved - not_worked;
    store.set_field(id, FieldUpdate::Worked(worked))?;
    info!(
        id,
        actual = %format_duration(actual),
        worked = %format_duration(worked),
        "session reconciled"
    );

    outcome?;
    Ok(WorkSession {
        id,
        expected,
        actual,
        worked_before,
        worked,
    })
}

/// Asks whether the task is finished and marks it complete on `y`.
pub fn finish_work<S: Storage>(
    store: &TaskStore<S>,
    id: i64,
    prompter: &mut impl Prompter,
) -> Result<Confirmation> {
    store.get_row(id)?;
    let answer = prompter.ask(CONFIRM_PROMPT)?;
    match answer.trim() {
        "y" => {
            store.complete(id)?;
            Ok(Confirmation::Completed)
        }
        "n" => {
            prompter.show("Task not completed.");
            Ok(Confirmation::LeftOpen)
        }
        other => {
            warn!(input = other, "unrecognised answer to completion prompt");
            prompter.show("Invalid input.");
            Ok(Confirmation::Invalid(other.to_string()))
        }
    }
}

/// A whole session: pick, time, confirm. `None` when no task was picked.
pub fn work<S: Storage>(
    store: &TaskStore<S>,
    duration: &str,
    clock: &impl Clock,
    countdown: &mut impl Countdown,
    prompter: &mut impl Prompter,
) -> Result<Option<(WorkSession, Confirmation)>> {
    // Fail on a bad duration before asking anything.
    parse_duration(duration)?;

    let Some(id) = pick_task(store, prompter)? else {
        return Ok(None);
    };
    let task = store.get_row(id)?;
    prompter.show(&format!("Task: {}", task.task));

    let session = start_work(store, id, duration, clock, countdown)?;
    prompter.show(&format!(
        "Worked {} this session ({} total).",
        format_duration(session.actual),
        format_duration(session.worked)
    ));
    let confirmation = finish_work(store, id, prompter)?;
    Ok(Some((session, confirmation)))
}
