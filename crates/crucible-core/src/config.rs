//! Configuration for the execution engine.
//!
//! The engine is built once at startup from a plain configuration value:
//! base working directory, timeouts and the per-language command table.
//! Configuration is loaded from a YAML file; every field has a sensible
//! default so a minimal file only needs the command table.

use crate::errors::ExecutorError;
use crate::models::Language;
use crate::supervisor::DEFAULT_GRACE_MARGIN;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_BASE_WORKING_DIRECTORY: &str = "/tmp/";
// One hour in milliseconds.
const DEFAULT_TIMEOUT: u64 = 3_600_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Base working directory for the engine. A new directory is created
    /// here for each execution.
    #[serde(default = "default_base_working_directory")]
    pub base_working_directory: PathBuf,
    /// Execution timeout applied to requests that carry none, in ms.
    #[serde(default = "default_timeout")]
    pub default_timeout: u64,
    /// Timeout given to the launcher process in case it hangs, in ms. This
    /// is distinct from the execution timeout, which judges the code under
    /// test.
    #[serde(default = "default_timeout")]
    pub process_timeout: u64,
    /// Extra wait added to the process-wait bound, in ms.
    #[serde(default = "default_grace_margin")]
    pub grace_margin: u64,
    /// The command to be used for each language. Values can be shell
    /// scripts, executables or custom programs; anything the OS can spawn.
    #[serde(default)]
    pub commands: HashMap<Language, String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            base_working_directory: default_base_working_directory(),
            default_timeout: default_timeout(),
            process_timeout: default_timeout(),
            grace_margin: default_grace_margin(),
            commands: HashMap::new(),
        }
    }
}

impl ExecutorConfig {
    /// Loads a configuration from a YAML file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ExecutorError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ExecutorError::Configuration(format!(
                "could not read the configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            ExecutorError::Configuration(format!(
                "could not parse the configuration file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Checks the parts of the configuration that can be checked up front.
    /// The base working directory may be missing (it is created lazily),
    /// but an existing path must reference a directory.
    pub fn validate(&self) -> Result<(), ExecutorError> {
        if self.base_working_directory.exists() && !self.base_working_directory.is_dir() {
            return Err(ExecutorError::Configuration(format!(
                "the base working directory {} does not reference a directory",
                self.base_working_directory.display()
            )));
        }
        Ok(())
    }
}

fn default_base_working_directory() -> PathBuf {
    PathBuf::from(DEFAULT_BASE_WORKING_DIRECTORY)
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

fn default_grace_margin() -> u64 {
    DEFAULT_GRACE_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn a_minimal_file_gets_the_documented_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "commands:").unwrap();
        writeln!(file, "  PYTHON: /opt/runners/python.sh").unwrap();

        let config = ExecutorConfig::from_file(file.path()).await.unwrap();
        assert_eq!(config.base_working_directory, PathBuf::from("/tmp/"));
        assert_eq!(config.default_timeout, 3_600_000);
        assert_eq!(config.process_timeout, 3_600_000);
        assert_eq!(config.grace_margin, 10_000);
        assert_eq!(
            config.commands.get(&Language::Python).map(String::as_str),
            Some("/opt/runners/python.sh")
        );
    }

    #[tokio::test]
    async fn explicit_values_override_the_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "base_working_directory: /var/lib/crucible").unwrap();
        writeln!(file, "default_timeout: 5000").unwrap();
        writeln!(file, "process_timeout: 60000").unwrap();
        writeln!(file, "grace_margin: 2000").unwrap();
        writeln!(file, "commands:").unwrap();
        writeln!(file, "  C: /opt/runners/c.sh").unwrap();
        writeln!(file, "  JAVA: /opt/runners/java.sh").unwrap();

        let config = ExecutorConfig::from_file(file.path()).await.unwrap();
        assert_eq!(
            config.base_working_directory,
            PathBuf::from("/var/lib/crucible")
        );
        assert_eq!(config.default_timeout, 5000);
        assert_eq!(config.process_timeout, 60_000);
        assert_eq!(config.grace_margin, 2000);
        assert_eq!(config.commands.len(), 2);
    }

    #[tokio::test]
    async fn a_missing_file_is_a_configuration_error() {
        let result = ExecutorConfig::from_file("/nonexistent/crucible.yaml").await;
        assert!(matches!(result, Err(ExecutorError::Configuration(_))));
    }

    #[test]
    fn a_base_directory_that_is_a_file_fails_validation() {
        let file = NamedTempFile::new().unwrap();
        let config = ExecutorConfig {
            base_working_directory: file.path().to_path_buf(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ExecutorError::Configuration(_))
        ));
    }
}
