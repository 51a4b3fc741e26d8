//! `push`, `pull` and `delete`

use anyhow::Result;

use remote::{RemoteResult, SyncOptions, SyncedWorkspace};

use super::run::fan_out;
use super::targets;
use crate::cli::TargetArgs;

pub fn cmd_push(
    dry_run: bool,
    mirror: bool,
    verbose: bool,
    target: &TargetArgs,
    paths: &[String],
) -> Result<i32> {
    let workspaces = targets::resolve(target)?;
    let options = SyncOptions {
        info: true,
        verbose,
        dry_run,
        mirror,
    };

    let push = |workspace: &SyncedWorkspace| -> RemoteResult<i32> {
        if paths.is_empty() {
            workspace.push(&options, None)?;
        }
        for path in paths {
            workspace.push(&options, Some(path.as_str()))?;
        }
        Ok(0)
    };

    if target.multi {
        return Ok(fan_out(&workspaces, push));
    }
    for workspace in &workspaces {
        push(workspace)?;
    }
    Ok(0)
}

pub fn cmd_pull(dry_run: bool, verbose: bool, label: Option<String>, paths: &[String]) -> Result<i32> {
    let workspace = targets::single(label)?;
    let options = SyncOptions {
        info: true,
        verbose,
        dry_run,
        mirror: false,
    };

    if paths.is_empty() {
        workspace.pull(&options, None)?;
    }
    for path in paths {
        workspace.pull(&options, Some(path.as_str()))?;
    }
    Ok(0)
}

pub fn cmd_delete(label: Option<String>) -> Result<i32> {
    let workspace = targets::single(label)?;
    workspace.clear_remote()?;
    println!(
        "Successfully deleted {} on host {}",
        workspace.remote.directory, workspace.remote.host
    );
    Ok(0)
}
