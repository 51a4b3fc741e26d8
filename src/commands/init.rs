//! `init` and `add`

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use remote::config::{parse_connection_string, Mediums};
use remote::domain::ports::ConfigurationMedium;
use remote::infrastructure::RsyncTransfer;
use remote::{HostSelector, RemoteEndpoint, RemoteError, SyncedWorkspace, WorkspaceConfig};

use crate::cli::HostArgs;

const GITIGNORE_ENTRY: &str = ".remote*";

/// Set up a workspace rooted at the current directory
pub fn cmd_init(args: &HostArgs) -> Result<i32> {
    let root = std::env::current_dir()?;
    let mediums = Mediums::default();
    if mediums.is_workspace_root(&root) {
        return Err(RemoteError::Configuration(
            "A configured workspace already exists in the current directory. Use 'remote add' to add another host"
                .to_string(),
        )
        .into());
    }

    if !RsyncTransfer::check_available() {
        warn!("rsync was not found on PATH. It is required to sync files with the remote host");
    }

    // Labels and ports only survive in the TOML layout
    let medium: &dyn ConfigurationMedium = if args.label.is_some() || args.port.is_some() {
        &mediums.toml
    } else {
        &mediums.classic
    };

    let mut config = WorkspaceConfig::empty(&root);
    add_remote_host(&mut config, medium, args)?;
    println!("Remote is configured and ready to use");

    if root.join(".git").exists() && add_to_gitignore(&root)? {
        println!("Added '{}' to .gitignore", GITIGNORE_ENTRY);
    }
    Ok(0)
}

/// Add one more host to the workspace containing the current directory
pub fn cmd_add(args: &HostArgs) -> Result<i32> {
    let mediums = Mediums::default();
    let (mut config, medium) = mediums.locate(&std::env::current_dir()?)?;
    if medium.name() == "classic" && (args.label.is_some() || args.port.is_some()) {
        warn!("Labels and ports are not stored in classic workspaces and will be dropped");
    }

    add_remote_host(&mut config, medium, args)?;
    Ok(0)
}

/// Register the host, create its directory remotely, then persist.
///
/// Nothing is saved unless the remote directory could be created.
fn add_remote_host(
    config: &mut WorkspaceConfig,
    medium: &dyn ConfigurationMedium,
    args: &HostArgs,
) -> Result<bool> {
    let (host, directory) = parse_connection_string(&args.connection)?;
    let directory = match directory {
        Some(directory) => directory,
        None => medium.generate_remote_directory(config)?,
    };

    let mut endpoint = RemoteEndpoint::new(host, directory);
    if let Some(label) = &args.label {
        endpoint = endpoint.with_label(label.as_str());
    }
    if let Some(port) = args.port {
        endpoint = endpoint.with_port(port);
    }

    let (added, index) = config.add_remote_host(endpoint);
    if !added {
        println!("{} already exists in config", args.connection);
        return Ok(false);
    }

    let root = config.root.clone();
    let workspace = SyncedWorkspace::from_config(config, &root, Some(&HostSelector::Index(index)))?;
    workspace.create_remote()?;
    println!("Created remote directory at {}", workspace.remote.location());

    medium.save_config(config)?;
    Ok(true)
}

/// Append the config file pattern unless some `.remote` entry is present
fn add_to_gitignore(root: &Path) -> Result<bool> {
    let path = root.join(".gitignore");
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.lines().any(|line| line.starts_with(".remote")) {
            return Ok(false);
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    write!(file, "\n{}\n", GITIGNORE_ENTRY)?;
    Ok(true)
}
