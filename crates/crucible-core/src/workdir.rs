//! Per-execution working directory management.

use crate::errors::ExecutorError;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Creates a fresh, uniquely named directory under a configured base for
/// every execution. Concurrent executions get disjoint directories, so no
/// locking is needed between them.
///
/// Directories are never removed once an execution finishes; cleanup policy
/// is left to the operator of the base directory.
#[derive(Debug, Clone)]
pub struct WorkingDirectoryManager {
    base_dir: PathBuf,
}

impl WorkingDirectoryManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Creates the working directory where one execution will run, creating
    /// the base directory first if needed.
    ///
    /// A name collision is treated as a fatal error rather than retried; with
    /// random UUID names it only happens when something else owns the path.
    pub fn create(&self) -> Result<PathBuf, ExecutorError> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir).map_err(|e| {
                ExecutorError::Directory(format!(
                    "the base working directory {} does not exist and could not be created: {}",
                    self.base_dir.display(),
                    e
                ))
            })?;
        }
        let working_dir = self.base_dir.join(Uuid::new_v4().to_string());
        if working_dir.exists() {
            return Err(ExecutorError::Directory(format!(
                "the working directory to be created already exists: {}",
                working_dir.display()
            )));
        }
        fs::create_dir(&working_dir).map_err(|e| {
            ExecutorError::Directory(format!(
                "could not create the working directory {}: {}",
                working_dir.display(),
                e
            ))
        })?;
        Ok(working_dir)
    }
}
