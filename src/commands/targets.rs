//! Workspace resolution shared by the handlers

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use remote::{Communication, HostSelector, SyncedWorkspace};

use crate::cli::TargetArgs;

/// Selector for an optional `--label`
pub fn selector(label: Option<String>) -> Option<HostSelector> {
    label.map(HostSelector::Label)
}

/// Workspace bound to the selected (or default) host
pub fn single(label: Option<String>) -> Result<SyncedWorkspace> {
    Ok(SyncedWorkspace::from_cwd(selector(label).as_ref())?)
}

/// One workspace per selected host: all of them with `--multi`
pub fn resolve(target: &TargetArgs) -> Result<Vec<SyncedWorkspace>> {
    if !target.multi {
        return Ok(vec![single(target.label.clone())?]);
    }

    let working_dir = std::env::current_dir()?;
    let config = remote::config::load_workspace_config(&working_dir)?;
    Ok(SyncedWorkspace::from_config_mass(&config, &working_dir)?)
}

/// Timestamped directory for one invocation's logs
pub fn log_directory(base: &Path) -> PathBuf {
    base.join(Local::now().format("%Y-%m-%d_%H-%M-%S").to_string())
}

/// Redirect every workspace's output into `<dir>/<n>-<host>.log`
pub fn attach_logs(workspaces: Vec<SyncedWorkspace>, base: &Path) -> Result<Vec<SyncedWorkspace>> {
    let dir = log_directory(base);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    workspaces
        .into_iter()
        .enumerate()
        .map(|(index, workspace)| {
            let path = dir.join(format!("{}-{}.log", index + 1, workspace.remote.host));
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Ok(workspace.with_communication(Communication::to_file(file)))
        })
        .collect()
}
