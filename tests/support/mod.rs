#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{DateTime, Duration, Local, TimeZone};
use tasker::error::{Error, Result};
use tasker::prompt::Prompter;
use tasker::storage::FileStorage;
use tasker::store::TaskStore;
use tasker::tracking::{Clock, Countdown};
use tempfile::TempDir;

/// A store backed by a file in its own temp directory.
pub struct TestDb {
    dir: TempDir,
    pub store: TaskStore<FileStorage>,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let store = TaskStore::new(FileStorage::new(dir.path().join("tasks.json")));
        TestDb { dir, store }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Answers prompts from a fixed script and records everything shown.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
    pub shown: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedPrompter {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn saw(&self, needle: &str) -> bool {
        self.shown.iter().any(|s| s.contains(needle))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted")))
    }

    fn show(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }
}

/// A clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = Local
            .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
            .single()
            .expect("unambiguous start time");
        ManualClock {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

/// Countdown that "runs" by advancing a shared manual clock.
pub struct FakeCountdown {
    clock: ManualClock,
    elapse: Duration,
    fail: bool,
    pub runs: RefCell<Vec<(Duration, String)>>,
}

impl FakeCountdown {
    /// Returns after `elapse` has passed on `clock`, whatever it was asked for.
    pub fn new(clock: &ManualClock, elapse: Duration) -> Self {
        FakeCountdown {
            clock: clock.clone(),
            elapse,
            fail: false,
            runs: RefCell::new(Vec::new()),
        }
    }

    /// Like `new`, but the run ends with a terminal error.
    pub fn failing(clock: &ManualClock, elapse: Duration) -> Self {
        FakeCountdown {
            fail: true,
            ..Self::new(clock, elapse)
        }
    }
}

impl Countdown for FakeCountdown {
    fn run(&mut self, duration: Duration, title: &str) -> Result<()> {
        self.runs.borrow_mut().push((duration, title.to_string()));
        self.clock.advance(self.elapse);
        if self.fail {
            return Err(Error::Io(io::Error::new(io::ErrorKind::Other, "terminal went away")));
        }
        Ok(())
    }
}
