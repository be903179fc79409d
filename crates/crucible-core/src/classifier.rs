//! Outcome classification from the sentinel file and captured output.
//!
//! Classification is pure data interpretation: whatever state the sentinel
//! file is in, the classifier produces a well-formed result and never an
//! error. Anything it cannot make sense of degrades to an unknown-error
//! outcome with a warning logged.

use crate::launcher::RESULT_FILE_NAME;
use crate::models::{ExecutionRequest, ExecutionResult};
use std::path::Path;
use std::process::Output;
use std::sync::Arc;

/// The child's self-reported terminal classification, parsed from the first
/// line of the sentinel file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Finished,
    Timeout,
    CompileError,
    InitializationError,
    UnknownError,
}

impl Verdict {
    /// Parses a sentinel token, case-insensitively. Unrecognized content
    /// yields `None`.
    pub fn from_sentinel(token: &str) -> Option<Verdict> {
        let token = token.trim();
        let verdicts = [
            ("FINISHED", Verdict::Finished),
            ("TIMEOUT", Verdict::Timeout),
            ("COMPILE_ERROR", Verdict::CompileError),
            ("INITIALIZATION_ERROR", Verdict::InitializationError),
            ("UNKNOWN_ERROR", Verdict::UnknownError),
        ];
        verdicts
            .iter()
            .find(|(name, _)| token.eq_ignore_ascii_case(name))
            .map(|(_, verdict)| *verdict)
    }
}

/// Builds the [`ExecutionResult`] for a process that completed within the
/// wait bound, combining the sentinel verdict with the captured exit code
/// and output.
pub fn classify(
    request: Arc<ExecutionRequest>,
    working_dir: &Path,
    output: &Output,
) -> ExecutionResult {
    let verdict = read_verdict(working_dir);
    // A process killed by a signal reports no exit code.
    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = split_lines(&output.stdout);
    let stderr = split_lines(&output.stderr);

    match verdict {
        Verdict::Finished => ExecutionResult::finished(exit_code, stdout, stderr, request),
        // The child can self-report a timeout even though it exited in time.
        Verdict::Timeout => ExecutionResult::timed_out(request),
        Verdict::CompileError => {
            match ExecutionResult::compile_error(exit_code, stdout, stderr, Arc::clone(&request)) {
                Ok(result) => result,
                Err(_) => {
                    log::warn!(
                        "the sentinel reported a compile error for {}, which is not a compiled \
                         language",
                        request.language
                    );
                    ExecutionResult::unknown_error(request)
                }
            }
        }
        Verdict::InitializationError => ExecutionResult::initialization_error(request),
        Verdict::UnknownError => ExecutionResult::unknown_error(request),
    }
}

/// Reads the verdict from the sentinel file in the working directory.
/// A missing, empty or unrecognizable sentinel is an unknown error, not a
/// failure.
fn read_verdict(working_dir: &Path) -> Verdict {
    let sentinel_path = working_dir.join(RESULT_FILE_NAME);
    let contents = match std::fs::read_to_string(&sentinel_path) {
        Ok(contents) => contents,
        Err(e) => {
            log::warn!(
                "could not read the sentinel file {}: {}",
                sentinel_path.display(),
                e
            );
            return Verdict::UnknownError;
        }
    };
    match contents.lines().next() {
        Some(line) => Verdict::from_sentinel(line).unwrap_or_else(|| {
            log::warn!("an unexpected sentinel value ({}) was received", line);
            Verdict::UnknownError
        }),
        None => {
            log::warn!("the sentinel file {} is empty", sentinel_path.display());
            Verdict::UnknownError
        }
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_owned)
        .collect()
}
