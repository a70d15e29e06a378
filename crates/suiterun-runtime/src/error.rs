//! Runtime error types

use anyhow;
use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = anyhow::Result<T>;

/// Runtime error (re-export anyhow for setup and reporting failures)
pub type Error = anyhow::Error;

/// A test that could not be executed properly.
///
/// These never abort a run; the engine keeps the first one it sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("error running {test_id}: {message}")]
pub struct ExecutionError {
    /// Test the error belongs to
    pub test_id: String,
    /// What went wrong
    pub message: String,
}

impl ExecutionError {
    /// Create a new execution error
    pub fn new(test_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            message: message.into(),
        }
    }
}
