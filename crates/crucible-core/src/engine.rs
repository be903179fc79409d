//! The execution engine facade and its inbound port.

use crate::classifier;
use crate::config::ExecutorConfig;
use crate::errors::ExecutorError;
use crate::launcher::ProcessLauncher;
use crate::models::{ExecutionRequest, ExecutionResult, Language};
use crate::supervisor::TimeoutSupervisor;
use crate::workdir::WorkingDirectoryManager;
use async_trait::async_trait;
use std::sync::Arc;

/// Inbound port for processing execution requests. Called synchronously or
/// asynchronously by whatever transport adapter fronts the engine.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn process(&self, request: ExecutionRequest)
        -> Result<ExecutionResult, ExecutorError>;
}

/// Orchestrates one execution: working directory creation, process launch,
/// bounded wait and outcome classification, strictly in that order.
///
/// The engine holds no mutable state, so a single instance serves any
/// number of concurrent requests; executions only share the base working
/// directory, which they write to through disjoint subdirectories. There is
/// no retry anywhere in here: an engine-level error aborts exactly the one
/// request that raised it, and retry policy belongs to the caller.
pub struct CodeExecutionEngine {
    working_directories: WorkingDirectoryManager,
    launcher: ProcessLauncher,
    supervisor: TimeoutSupervisor,
}

impl CodeExecutionEngine {
    /// Builds an engine from a configuration value. Fails when the base
    /// working directory exists but is not a directory.
    pub fn from_config(config: ExecutorConfig) -> Result<Self, ExecutorError> {
        config.validate()?;
        Ok(Self {
            working_directories: WorkingDirectoryManager::new(config.base_working_directory),
            launcher: ProcessLauncher::new(config.commands),
            supervisor: TimeoutSupervisor::new(
                config.default_timeout,
                config.process_timeout,
                config.grace_margin,
            ),
        })
    }

    /// Convenience entry point for callers that only have the bare job
    /// parameters at hand.
    pub async fn run_code(
        &self,
        code: impl Into<String>,
        stdin: Vec<String>,
        timeout: Option<u64>,
        language: Language,
    ) -> Result<ExecutionResult, ExecutorError> {
        self.process(ExecutionRequest::new(code, vec![], stdin, timeout, language))
            .await
    }
}

#[async_trait]
impl CodeExecutor for CodeExecutionEngine {
    async fn process(
        &self,
        request: ExecutionRequest,
    ) -> Result<ExecutionResult, ExecutorError> {
        let request = Arc::new(request);
        let working_dir = self.working_directories.create()?;
        log::debug!(
            "processing a {} request in {}",
            request.language,
            working_dir.display()
        );

        let effective_timeout = self.supervisor.effective_timeout(&request);
        let child = self
            .launcher
            .launch(&request, &working_dir, effective_timeout)
            .await?;
        let wait_timeout = self.supervisor.wait_timeout(effective_timeout);

        // The working directory is left in place afterwards in either
        // branch; cleanup is an operator concern (see DESIGN.md).
        match self.supervisor.await_completion(child, wait_timeout).await? {
            Some(output) => Ok(classifier::classify(request, &working_dir, &output)),
            None => Ok(ExecutionResult::timed_out(request)),
        }
    }
}
