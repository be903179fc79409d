//! Error types for failure handling across the execution engine
//!
//! Engine-level errors abort only the request that raised them. Everything
//! the child process itself can get wrong (timing out, writing a garbled
//! sentinel, reporting a bogus classification) is not an error: those cases
//! are ordinary [`ExecutionResult`](crate::models::ExecutionResult) variants
//! handed back to the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Working directory error: {0}")]
    Directory(String),
    #[error("The execution failed unexpectedly: {source}")]
    ExecutionFailed {
        #[from]
        source: std::io::Error,
    },
}
