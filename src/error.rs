//! Error types for tasker.
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (empty task text, bad duration, unknown id, bad selection)
//! - 3: Refused to proceed (schema mismatch, duplicate ids, ambiguous store files)
//! - 4: Operation failed (I/O, lock contention, encoding)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the tasker CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const DATA_ERROR: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tasker operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("{0}")]
    Validation(String),

    #[error("Task {0} does not exist.")]
    NotFound(i64),

    #[error("No tasks found.")]
    EmptyView,

    #[error("Task {index} does not exist (choose 0..{len}).")]
    OutOfRange { index: usize, len: usize },

    // Refuse to proceed (exit code 3)
    #[error("Schema mismatch: {0}")]
    Schema(String),

    #[error("Data corruption: {0}")]
    DataCorruption(String),

    #[error("Both {legacy} and {native} exist; remove one before continuing")]
    AmbiguousStorage { legacy: PathBuf, native: PathBuf },

    // Operation failures (exit code 4)
    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::NotFound(_)
            | Error::EmptyView
            | Error::OutOfRange { .. } => exit_codes::USER_ERROR,

            Error::Schema(_) | Error::DataCorruption(_) | Error::AmbiguousStorage { .. } => {
                exit_codes::DATA_ERROR
            }

            Error::LockFailed(_) | Error::Io(_) | Error::Json(_) | Error::Csv(_) => {
                exit_codes::OPERATION_FAILED
            }
        }
    }

    /// Whether the store is in a state the tool must not try to repair.
    pub fn is_fatal(&self) -> bool {
        self.exit_code() == exit_codes::DATA_ERROR
    }

    /// One-line message for stderr. Fatal errors say the store was left alone.
    pub fn diagnostic(&self) -> String {
        if self.is_fatal() {
            format!("refusing to proceed: {}", self)
        } else {
            format!("error: {}", self)
        }
    }
}

/// Result type alias for tasker operations
pub type Result<T> = std::result::Result<T, Error>;
