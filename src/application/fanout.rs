//! Multi-host fan-out
//!
//! Runs one operation against every workspace in parallel, one thread per
//! endpoint, and folds the results into a single exit code.

use std::thread;

use tracing::debug;

use super::workspace::SyncedWorkspace;
use crate::error::{RemoteResult, CONNECTION_FAILURE_CODE};

/// A worker that ended with an error instead of an exit code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFailure {
    /// Position of the endpoint in configuration order
    pub index: usize,
    pub host: String,
    pub kind: String,
    pub message: String,
}

impl std::fmt::Display for WorkerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.host, self.kind, self.message)
    }
}

/// Combined result of all workers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutOutcome {
    /// Last non-zero exit code in endpoint order, or 0
    pub exit_code: i32,
    /// Per-host exit codes, in endpoint order
    pub codes: Vec<(String, i32)>,
    pub failures: Vec<WorkerFailure>,
}

impl FanOutOutcome {
    /// Lines describing every host that did not succeed, failures first.
    ///
    /// A host whose worker failed is only reported through its failure.
    pub fn report(&self) -> Vec<String> {
        let failed = self.failures.iter().map(ToString::to_string);
        let exited = self
            .codes
            .iter()
            .enumerate()
            .filter(|(index, (_, code))| {
                *code != 0 && !self.failures.iter().any(|f| f.index == *index)
            })
            .map(|(_, (host, code))| format!("{}: remote command exited with {}", host, code));
        failed.chain(exited).collect()
    }
}

/// Run `operation` on every workspace concurrently.
///
/// A failing worker never stops its siblings: its error is recorded and
/// counted as exit code 255.
pub fn run_on_all<F>(workspaces: &[SyncedWorkspace], operation: F) -> FanOutOutcome
where
    F: Fn(&SyncedWorkspace) -> RemoteResult<i32> + Sync,
{
    let operation = &operation;
    let results: Vec<(String, Result<i32, WorkerFailure>)> = thread::scope(|scope| {
        let handles: Vec<_> = workspaces
            .iter()
            .map(|workspace| {
                let host = workspace.remote.host.clone();
                debug!("Starting worker for {}", host);
                (host, scope.spawn(move || operation(workspace)))
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(index, (host, handle))| {
                let result = match handle.join() {
                    Ok(Ok(code)) => Ok(code),
                    Ok(Err(e)) => Err(WorkerFailure {
                        index,
                        host: host.clone(),
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    }),
                    Err(_) => Err(WorkerFailure {
                        index,
                        host: host.clone(),
                        kind: "Panic".to_string(),
                        message: "worker thread panicked".to_string(),
                    }),
                };
                (host, result)
            })
            .collect()
    });

    let mut outcome = FanOutOutcome::default();
    for (host, result) in results {
        let code = match result {
            Ok(code) => code,
            Err(failure) => {
                outcome.failures.push(failure);
                CONNECTION_FAILURE_CODE
            }
        };
        if code != 0 {
            outcome.exit_code = code;
        }
        outcome.codes.push((host, code));
    }
    outcome
}
