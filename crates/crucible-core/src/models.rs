//! Request and result value types for the execution engine.
//!
//! An [`ExecutionRequest`] describes one code-execution job; an
//! [`ExecutionResult`] pairs the originating request with the
//! [`ExecutionOutcome`] that came out of running it. The serde shapes here
//! are part of the external wire contract: request fields are camelCase and
//! outcomes are tagged with a `type` discriminator, matching the JSON the
//! pre-existing clients of the service already produce and consume.

use crate::errors::ExecutorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A supported language runtime or compiler toolchain.
///
/// The mapping from a language to the actual launch command is external
/// configuration (see [`ExecutorConfig`](crate::config::ExecutorConfig));
/// the engine fails with a configuration error when a request names a
/// language without a mapped command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    Python,
    Ruby,
    Java,
    C,
}

impl Language {
    /// Whether sources in this language go through a compilation step before
    /// running. Only compiled languages may produce a compile-error outcome.
    pub fn is_compiled(&self) -> bool {
        matches!(self, Language::Java | Language::C)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Python => "PYTHON",
            Language::Ruby => "RUBY",
            Language::Java => "JAVA",
            Language::C => "C",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Language {
    type Err = ExecutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PYTHON" => Ok(Language::Python),
            "RUBY" => Ok(Language::Ruby),
            "JAVA" => Ok(Language::Java),
            "C" => Ok(Language::C),
            other => Err(ExecutorError::Validation(format!(
                "unknown language '{}'",
                other
            ))),
        }
    }
}

/// One code-execution job description.
///
/// An empty `code` string is structurally valid; the configured command for
/// the language decides what to make of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub code: String,
    /// Arguments appended to the launch command, in order.
    #[serde(default)]
    pub program_arguments: Vec<String>,
    /// Lines written to the child's standard input, in order.
    #[serde(default)]
    pub stdin: Vec<String>,
    /// Execution timeout in milliseconds. Absent means the configured
    /// default applies.
    #[serde(default)]
    pub timeout: Option<u64>,
    pub language: Language,
    #[serde(default)]
    pub compiler_flags: Option<String>,
    #[serde(default)]
    pub main_file_name: Option<String>,
}

impl ExecutionRequest {
    pub fn new(
        code: impl Into<String>,
        program_arguments: Vec<String>,
        stdin: Vec<String>,
        timeout: Option<u64>,
        language: Language,
    ) -> Self {
        Self {
            code: code.into(),
            program_arguments,
            stdin,
            timeout,
            language,
            compiler_flags: None,
            main_file_name: None,
        }
    }

    pub fn with_compiler_flags(mut self, compiler_flags: impl Into<String>) -> Self {
        self.compiler_flags = Some(compiler_flags.into());
        self
    }

    pub fn with_main_file_name(mut self, main_file_name: impl Into<String>) -> Self {
        self.main_file_name = Some(main_file_name.into());
        self
    }
}

/// The tagged outcome of attempting to run a request.
///
/// The `type` tags and camelCase field names are the wire discriminators
/// used by existing consumers; do not rename them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ExecutionOutcome {
    /// The execution ran to completion (successfully or not; the exit code
    /// tells which).
    Finished {
        exit_code: i32,
        stdout: Vec<String>,
        stderr: Vec<String>,
    },
    /// The code did not compile. Only valid for compiled languages.
    CompileError {
        exit_code: i32,
        stdout: Vec<String>,
        stderr: Vec<String>,
    },
    /// The execution did not finish within the allowed time, as observed by
    /// the supervisor or self-reported by the child.
    TimedOut,
    /// The child could not set its execution environment up.
    InitializationError,
    /// Anything the child reported that the engine could not make sense of.
    UnknownError,
}

/// An execution result: the outcome of a request, holding a back-reference
/// to the request it belongs to. Equality is defined by the originating
/// request plus the outcome data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    #[serde(rename = "executionRequest")]
    request: Arc<ExecutionRequest>,
    #[serde(flatten)]
    outcome: ExecutionOutcome,
}

impl ExecutionResult {
    pub fn finished(
        exit_code: i32,
        stdout: Vec<String>,
        stderr: Vec<String>,
        request: Arc<ExecutionRequest>,
    ) -> Self {
        Self {
            request,
            outcome: ExecutionOutcome::Finished {
                exit_code,
                stdout,
                stderr,
            },
        }
    }

    /// Builds a compile-error result. Fails when the request's language is
    /// not compiled, since such a result would be contradictory.
    pub fn compile_error(
        exit_code: i32,
        stdout: Vec<String>,
        stderr: Vec<String>,
        request: Arc<ExecutionRequest>,
    ) -> Result<Self, ExecutorError> {
        if !request.language.is_compiled() {
            return Err(ExecutorError::Validation(format!(
                "a compile error result requires a compiled language, but {} is not",
                request.language
            )));
        }
        Ok(Self {
            request,
            outcome: ExecutionOutcome::CompileError {
                exit_code,
                stdout,
                stderr,
            },
        })
    }

    pub fn timed_out(request: Arc<ExecutionRequest>) -> Self {
        Self {
            request,
            outcome: ExecutionOutcome::TimedOut,
        }
    }

    pub fn initialization_error(request: Arc<ExecutionRequest>) -> Self {
        Self {
            request,
            outcome: ExecutionOutcome::InitializationError,
        }
    }

    pub fn unknown_error(request: Arc<ExecutionRequest>) -> Self {
        Self {
            request,
            outcome: ExecutionOutcome::UnknownError,
        }
    }

    pub fn request(&self) -> &ExecutionRequest {
        &self.request
    }

    pub fn outcome(&self) -> &ExecutionOutcome {
        &self.outcome
    }
}
