mod support;

use chrono::Duration;
use support::{FakeCountdown, ManualClock, ScriptedPrompter, TestDb};
use tasker::commands::*;
use tasker::error::Error;
use tasker::models::{Field, Value};
use tasker::store::SortKey;

#[test]
fn test_new_with_and_without_text() {
    let db = TestDb::new();
    let mut prompter = ScriptedPrompter::new(&["  typed in  "]);

    assert_eq!(cmd_new(&db.store, Some("Test Task".into()), &mut prompter).unwrap(), 0);
    assert_eq!(cmd_new(&db.store, None, &mut prompter).unwrap(), 1);

    assert_eq!(db.store.get(1, Field::Task).unwrap(), Value::Text("typed in".into()));
    assert!(prompter.saw("Task added (id = 1)"));
}

#[test]
fn test_new_rejects_blank_text() {
    let db = TestDb::new();
    let mut prompter = ScriptedPrompter::new(&["   "]);
    assert!(matches!(cmd_new(&db.store, None, &mut prompter), Err(Error::Validation(_))));
    assert!(db.store.all().unwrap().is_empty());
}

#[test]
fn test_complete_by_id_and_by_choice() {
    let db = TestDb::new();
    let mut prompter = ScriptedPrompter::new(&["0"]);
    db.store.append("first").unwrap();
    db.store.append("second").unwrap();

    assert_eq!(cmd_complete(&db.store, Some(0), &mut prompter).unwrap(), Some(0));
    // Only task 1 is still open, so it sits at position 0.
    assert_eq!(cmd_complete(&db.store, None, &mut prompter).unwrap(), Some(1));
    assert!(db.store.todo().unwrap().is_empty());
}

#[test]
fn test_complete_with_nothing_open() {
    let db = TestDb::new();
    let mut prompter = ScriptedPrompter::new(&[]);
    assert!(matches!(cmd_complete(&db.store, None, &mut prompter), Err(Error::EmptyView)));
}

#[test]
fn test_delete_by_choice() {
    let db = TestDb::new();
    db.store.append("keep").unwrap();
    db.store.append("drop").unwrap();
    let id = db.store.all().unwrap()[0].id;
    let mut prompter = ScriptedPrompter::new(&["0", "no thanks"]);

    assert_eq!(cmd_delete(&db.store, None, &mut prompter).unwrap(), Some(id));
    assert_eq!(db.store.all().unwrap().len(), 1);

    assert_eq!(cmd_delete(&db.store, None, &mut prompter).unwrap(), None);
    assert!(prompter.saw("No task deleted."));
    assert_eq!(db.store.all().unwrap().len(), 1);
}

#[test]
fn test_delete_unknown_id() {
    let db = TestDb::new();
    db.store.append("a").unwrap();
    let mut prompter = ScriptedPrompter::new(&[]);
    assert!(matches!(cmd_delete(&db.store, Some(5), &mut prompter), Err(Error::NotFound(5))));
}

#[test]
fn test_list() {
    let db = TestDb::new();
    let mut prompter = ScriptedPrompter::new(&[]);
    cmd_list(&db.store, SortKey::Created, true, &mut prompter).unwrap();
    assert!(prompter.saw("No tasks found."));

    db.store.append("Write report").unwrap();
    db.store.complete(0).unwrap();
    cmd_list(&db.store, SortKey::Task, false, &mut prompter).unwrap();
    assert!(prompter.saw("Write report"));
    assert!(prompter.saw("Done"));
}

#[test]
fn test_todo_session() {
    let db = TestDb::new();
    db.store.append("existing").unwrap();
    let clock = ManualClock::new();
    let mut countdown = FakeCountdown::new(&clock, Duration::minutes(30));
    let mut prompter = ScriptedPrompter::new(&["0", "y"]);

    cmd_todo(&db.store, "1h", &clock, &mut countdown, &mut prompter).unwrap();

    assert_eq!(db.store.get(0, Field::Worked).unwrap(), Value::Duration(Duration::minutes(30)));
    assert_eq!(db.store.get(0, Field::Completed).unwrap(), Value::Bool(true));
    assert!(prompter.saw("Task 0 marked as complete."));
}

#[test]
fn test_countdown_parses_duration() {
    let clock = ManualClock::new();
    let mut countdown = FakeCountdown::new(&clock, Duration::zero());
    cmd_countdown("2m30s", Some("Tea".into()), &mut countdown).unwrap();
    assert_eq!(
        countdown.runs.borrow().as_slice(),
        &[(Duration::seconds(150), "Tea".to_string())]
    );
    assert!(matches!(
        cmd_countdown("later", None, &mut countdown),
        Err(Error::Validation(_))
    ));
}
