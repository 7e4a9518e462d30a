//! # Tasker
//!
//! A single-user task list with built-in time tracking. Pick a task, run a
//! full-screen countdown while you work on it, and the time you actually spent is
//! added to the task.
//!
//! Each invocation loads the whole collection from one file, performs one
//! operation, and writes the whole collection back. See [`store::TaskStore`] for
//! the operations and [`tracking`] for how session time is accounted.

pub mod commands;
pub mod config;
pub mod countdown;
pub mod duration;
pub mod error;
pub mod models;
pub mod prompt;
pub mod schema;
pub mod selection;
pub mod storage;
pub mod store;
pub mod tracking;
