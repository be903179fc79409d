//! Bounded waiting for child process completion.

use crate::errors::ExecutorError;
use crate::models::ExecutionRequest;
use std::process::Output;
use std::time::Duration;
use tokio::process::Child;

/// Default extra wait added to the nominal timeout bound, in milliseconds.
pub const DEFAULT_GRACE_MARGIN: u64 = 10_000;

/// Computes timeout bounds and waits for child processes.
///
/// Two distinct timeouts are in play. The *effective execution timeout* is
/// what the child is told via the `TIMEOUT` environment variable and is
/// meant to judge the code being run. The *process wait timeout* is how
/// long the engine itself waits for the child before declaring it timed
/// out, and exists so a hung launcher script cannot pin a request forever.
#[derive(Debug, Clone)]
pub struct TimeoutSupervisor {
    /// Execution timeout applied when a request carries none, in ms.
    default_timeout: u64,
    /// Timeout given to the launcher process in case it hangs, in ms.
    process_timeout: u64,
    /// Scheduling-jitter allowance added to the wait bound, in ms.
    grace_margin: u64,
}

impl TimeoutSupervisor {
    pub fn new(default_timeout: u64, process_timeout: u64, grace_margin: u64) -> Self {
        Self {
            default_timeout,
            process_timeout,
            grace_margin,
        }
    }

    /// The timeout value actually communicated to the child.
    pub fn effective_timeout(&self, request: &ExecutionRequest) -> u64 {
        request.timeout.unwrap_or(self.default_timeout)
    }

    /// The bound on how long the engine waits for process completion.
    pub fn wait_timeout(&self, effective_timeout: u64) -> u64 {
        effective_timeout.max(self.process_timeout) + self.grace_margin
    }

    /// Waits for the child to exit, bounded by `wait_timeout` milliseconds.
    ///
    /// Returns the captured output when the child exits in time, and `None`
    /// when the bound elapses first. In the latter case the child is *not*
    /// terminated: it keeps running on its own after the engine has given
    /// up on it (inherited behavior, see DESIGN.md). An I/O failure while
    /// waiting or capturing output is an execution failure.
    pub async fn await_completion(
        &self,
        child: Child,
        wait_timeout: u64,
    ) -> Result<Option<Output>, ExecutorError> {
        let bound = Duration::from_millis(wait_timeout);
        match tokio::time::timeout(bound, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(Some(output)),
            Ok(Err(e)) => Err(ExecutorError::from(e)),
            Err(_) => {
                log::warn!(
                    "the process did not complete within {} ms; abandoning the wait",
                    wait_timeout
                );
                Ok(None)
            }
        }
    }
}
