//! Process launching with the environment-variable contract.
//!
//! The launcher turns a request into a running OS process. Communication
//! with the per-language launcher scripts is deliberately stringly-typed:
//! the code, compiler flags, timeout, sentinel file name and main file name
//! travel as environment variables with fixed names, and the scripts report
//! their terminal classification through a single-line sentinel file. The
//! exact names and formats below are a compatibility contract with the
//! existing scripts; keep them verbatim.

use crate::errors::ExecutorError;
use crate::models::{ExecutionRequest, Language};
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};

/// Environment variable carrying the source code, verbatim.
pub const CODE_ENV_VARIABLE: &str = "CODE";
/// Environment variable carrying the compiler flags, or an empty string.
pub const COMPILER_FLAGS_ENV_VARIABLE: &str = "COMPILER_FLAGS";
/// Environment variable carrying the effective execution timeout, in
/// seconds, as a decimal string (e.g. `5.0`).
pub const TIMEOUT_ENV_VARIABLE: &str = "TIMEOUT";
/// Environment variable carrying the sentinel file name.
pub const RESULT_FILE_NAME_ENV_VARIABLE: &str = "RESULT_FILE_NAME";
/// Environment variable carrying the main file name, or an empty string.
pub const MAIN_FILE_NAME_ENV_VARIABLE: &str = "MAIN_FILE_NAME";

/// Name of the file where the child must store its classification.
pub const RESULT_FILE_NAME: &str = "result";

/// Builds and starts the per-language OS process for a request.
///
/// The command table values can be shell-script files, executables, custom
/// programs... anything the OS can spawn directly (no shell interpretation
/// is applied).
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    commands: HashMap<Language, String>,
}

impl ProcessLauncher {
    pub fn new(commands: HashMap<Language, String>) -> Self {
        Self { commands }
    }

    /// Resolves the command for the request's language, starts the process
    /// in `working_dir` with the environment contract set, streams the
    /// request's stdin lines to the child and closes the pipe.
    ///
    /// Fails with a configuration error when the language has no mapped
    /// command (nothing is spawned), and with an execution failure when the
    /// OS-level spawn itself fails.
    pub async fn launch(
        &self,
        request: &ExecutionRequest,
        working_dir: &Path,
        effective_timeout: u64,
    ) -> Result<Child, ExecutorError> {
        let program = self.commands.get(&request.language).ok_or_else(|| {
            ExecutorError::Configuration(format!(
                "no command configured for language {}",
                request.language
            ))
        })?;

        let main_file_name = request
            .main_file_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("");

        let mut command = Command::new(program);
        command
            .args(&request.program_arguments)
            .current_dir(working_dir)
            .env(CODE_ENV_VARIABLE, &request.code)
            .env(
                COMPILER_FLAGS_ENV_VARIABLE,
                request.compiler_flags.as_deref().unwrap_or(""),
            )
            .env(TIMEOUT_ENV_VARIABLE, timeout_as_seconds(effective_timeout))
            .env(RESULT_FILE_NAME_ENV_VARIABLE, RESULT_FILE_NAME)
            .env(MAIN_FILE_NAME_ENV_VARIABLE, main_file_name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn()?;
        log::debug!(
            "spawned '{}' for language {} in {}",
            program,
            request.language,
            working_dir.display()
        );

        // Write all stdin lines, then drop the handle so the child sees EOF.
        // An empty list sends EOF immediately. Write failures are not fatal:
        // a child that exits without reading its input closes the pipe early,
        // which says nothing about the execution itself.
        if let Some(mut stdin) = child.stdin.take() {
            for line in &request.stdin {
                if let Err(e) = write_line(&mut stdin, line).await {
                    log::warn!("could not write to the child's stdin: {}", e);
                    break;
                }
            }
            if let Err(e) = stdin.flush().await {
                log::warn!("could not flush the child's stdin: {}", e);
            }
        }

        Ok(child)
    }
}

async fn write_line(
    stdin: &mut tokio::process::ChildStdin,
    line: &str,
) -> Result<(), std::io::Error> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await
}

/// Formats a millisecond timeout as the decimal seconds string told to the
/// child, e.g. `5000` becomes `"5.0"` and `100` becomes `"0.1"`.
fn timeout_as_seconds(timeout_millis: u64) -> String {
    format!("{:?}", timeout_millis as f64 / 1000.0)
}
