//! Bare command and `quick`

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use remote::{run_on_all, ExecuteOptions, ForwardingOption, RemoteResult, SyncedWorkspace};

use super::targets;
use crate::cli::TargetArgs;

/// Top-level flags that shape the full cycle
#[derive(Debug, Default)]
pub struct RunFlags {
    pub dry_run: bool,
    pub mirror: bool,
    pub verbose: bool,
    pub tunnels: Vec<ForwardingOption>,
    pub stream_changes: bool,
    pub env: BTreeMap<String, String>,
    pub log: Option<PathBuf>,
}

/// Push, run `command`, pull, and exit with the remote exit code
pub fn cmd_run(command: &[String], flags: RunFlags, target: &TargetArgs) -> Result<i32> {
    let mut workspaces = targets::resolve(target)?;
    if let Some(dir) = &flags.log {
        workspaces = targets::attach_logs(workspaces, dir)?;
    }

    let options = ExecuteOptions {
        dry_run: flags.dry_run,
        verbose: flags.verbose,
        mirror: flags.mirror,
        ports: flags.tunnels,
        stream_changes: flags.stream_changes,
        env: flags.env,
        ..Default::default()
    };

    run_selected(&workspaces, target.multi, |workspace| {
        workspace.execute_in_synced_env(command, &options)
    })
}

/// Run `command` without syncing and exit with the remote exit code
pub fn cmd_quick(
    command: &[String],
    dry_run: bool,
    verbose: bool,
    tunnels: Vec<ForwardingOption>,
    target: &TargetArgs,
) -> Result<i32> {
    let workspaces = targets::resolve(target)?;
    let options = ExecuteOptions {
        dry_run,
        verbose,
        raise_on_error: false,
        ports: tunnels,
        ..Default::default()
    };

    run_selected(&workspaces, target.multi, |workspace| {
        workspace.execute(command, &options)
    })
}

fn run_selected<F>(workspaces: &[SyncedWorkspace], multi: bool, operation: F) -> Result<i32>
where
    F: Fn(&SyncedWorkspace) -> RemoteResult<i32> + Sync,
{
    if multi {
        return Ok(fan_out(workspaces, operation));
    }

    let Some(workspace) = workspaces.first() else {
        return Ok(0);
    };
    let code = operation(workspace)?;
    if code != 0 {
        eprintln!("Remote command exited with {}", code);
    }
    Ok(code)
}

/// Run on every host and report per-host problems on stderr
pub fn fan_out<F>(workspaces: &[SyncedWorkspace], operation: F) -> i32
where
    F: Fn(&SyncedWorkspace) -> RemoteResult<i32> + Sync,
{
    let outcome = run_on_all(workspaces, operation);
    for line in outcome.report() {
        eprintln!("{}", line);
    }
    outcome.exit_code
}
