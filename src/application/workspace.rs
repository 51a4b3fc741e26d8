//! Synced workspace
//!
//! Binds a local workspace root to one remote endpoint and drives the
//! push, execute, pull cycle against it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::load_workspace_config;
use crate::domain::entities::{RemoteEndpoint, WorkspaceConfig};
use crate::domain::ports::ProcessRunner;
use crate::domain::value_objects::{
    Communication, CompiledRules, ForwardingOption, HostSelector, Verbosity,
};
use crate::error::{RemoteError, RemoteResult};
use crate::infrastructure::process::SystemRunner;
use crate::infrastructure::remote::{
    prepare_shell_command, PortForwardingSession, RemoteShell, RsyncTransfer, TransferOptions,
};
use crate::watcher::{execute_on_file_change, WatchOptions};

/// File sourced on the remote side before every wrapped command
pub const REMOTE_ENV_FILE: &str = ".remoteenv";

/// Flags for `push` and `pull`
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Itemize transferred files
    pub info: bool,
    pub verbose: bool,
    pub dry_run: bool,
    /// Push only: also delete remote files that are excluded locally
    pub mirror: bool,
}

/// Flags for `execute` and `execute_in_synced_env`
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Run the command verbatim from the remote home directory
    pub simple: bool,
    /// Echo the command remotely instead of running it
    pub dry_run: bool,
    pub raise_on_error: bool,
    pub verbose: bool,
    /// Mirror on every push of the cycle, including resyncs
    pub mirror: bool,
    pub ports: Vec<ForwardingOption>,
    /// Push local changes while the command runs
    pub stream_changes: bool,
    /// Exported before the command; ignored in simple mode
    pub env: BTreeMap<String, String>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            simple: false,
            dry_run: false,
            raise_on_error: true,
            verbose: false,
            mirror: false,
            ports: Vec::new(),
            stream_changes: false,
            env: BTreeMap::new(),
        }
    }
}

impl ExecuteOptions {
    fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            info: false,
            verbose: self.verbose,
            dry_run: self.dry_run,
            mirror: self.mirror,
        }
    }
}

/// A local workspace bound to one remote endpoint.
#[derive(Clone)]
pub struct SyncedWorkspace {
    /// Absolute path to the root of the local workspace
    pub local_root: PathBuf,
    pub remote: RemoteEndpoint,
    /// Invocation directory relative to the root, `/`-separated, `.` at the root
    pub relative_dir: String,
    /// Remote counterpart of the invocation directory
    pub remote_working_dir: String,
    pub push_rules: CompiledRules,
    pub pull_rules: CompiledRules,
    pub communication: Communication,
    runner: Arc<dyn ProcessRunner>,
}

impl std::fmt::Debug for SyncedWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncedWorkspace")
            .field("local_root", &self.local_root)
            .field("remote", &self.remote)
            .field("remote_working_dir", &self.remote_working_dir)
            .finish_non_exhaustive()
    }
}

impl SyncedWorkspace {
    /// Bind `config` to one endpoint.
    ///
    /// No selector means the configured default; a label picks the first
    /// endpoint carrying it.
    pub fn from_config(
        config: &WorkspaceConfig,
        working_dir: &Path,
        selector: Option<&HostSelector>,
    ) -> RemoteResult<Self> {
        let index = match selector {
            None => config.default_configuration,
            Some(HostSelector::Index(index)) => *index,
            Some(HostSelector::Label(label)) => config
                .configurations
                .iter()
                .position(|c| c.label.as_deref() == Some(label.as_str()))
                .ok_or_else(|| RemoteError::InvalidRemoteHostLabel(label.clone()))?,
        };
        let remote = config.configurations.get(index).cloned().ok_or_else(|| {
            RemoteError::Configuration(format!(
                "Configuration #{} requested but there are only {} declared",
                index + 1,
                config.configurations.len()
            ))
        })?;

        let relative_dir = relative_posix(&config.root, working_dir)?;
        let remote_working_dir = posix_join(&remote.directory, &relative_dir);

        let mut push_rules = CompiledRules {
            excludes: config.ignores.compile_push(),
            includes: config.includes.compile_push(),
        };
        push_rules.includes.push(format!("/{}", REMOTE_ENV_FILE));

        Ok(Self {
            local_root: config.root.clone(),
            remote,
            relative_dir,
            remote_working_dir,
            push_rules,
            pull_rules: CompiledRules {
                excludes: config.ignores.compile_pull(),
                includes: config.includes.compile_pull(),
            },
            communication: Communication::default(),
            runner: Arc::new(SystemRunner),
        })
    }

    /// One workspace per configured endpoint, in configuration order
    pub fn from_config_mass(config: &WorkspaceConfig, working_dir: &Path) -> RemoteResult<Vec<Self>> {
        (0..config.configurations.len())
            .map(|index| Self::from_config(config, working_dir, Some(&HostSelector::Index(index))))
            .collect()
    }

    /// Discover the workspace containing the current directory
    pub fn from_cwd(selector: Option<&HostSelector>) -> RemoteResult<Self> {
        let working_dir = std::env::current_dir()?;
        let config = load_workspace_config(&working_dir)?;
        Self::from_config(&config, &working_dir, selector)
    }

    /// Spawn processes through `runner` instead of the system
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_communication(mut self, communication: Communication) -> Self {
        self.communication = communication;
        self
    }

    fn remote_shell(&self, verbose: bool) -> RemoteShell {
        RemoteShell {
            verbosity: Verbosity::from_flag(verbose),
            communication: self.communication.clone(),
            ..RemoteShell::for_endpoint(&self.remote)
        }
    }

    fn transfer_shell(&self) -> RemoteShell {
        RemoteShell {
            force_tty: false,
            ..self.remote_shell(false)
        }
    }

    /// Script run remotely for a wrapped command
    pub fn generate_command(&self, command: &str, env: &BTreeMap<String, String>) -> String {
        let exports: String = env
            .iter()
            .map(|(key, value)| {
                format!(
                    "export {}={}\n",
                    shell_words::quote(key),
                    shell_words::quote(value)
                )
            })
            .collect();

        format!(
            "cd {root}\nif [ -f {env_file} ]; then\n  source {env_file}\nfi\ncd {relative}\n{exports}{command}\n",
            root = self.remote.directory,
            env_file = REMOTE_ENV_FILE,
            relative = self.relative_dir,
        )
    }

    /// Push, execute, then pull, in that order.
    ///
    /// A failed push aborts the cycle. A failed command does not: pull
    /// always runs and the remote exit code is returned.
    pub fn execute_in_synced_env<S: AsRef<str>>(
        &self,
        command: &[S],
        options: &ExecuteOptions,
    ) -> RemoteResult<i32> {
        let sync = options.sync_options();
        self.push(&sync, None)?;

        let execute = ExecuteOptions {
            raise_on_error: false,
            ..options.clone()
        };
        let code = self.execute(command, &execute)?;
        if code != 0 {
            debug!("Remote command exited with {}", code);
        }

        self.pull(
            &SyncOptions {
                mirror: false,
                ..sync
            },
            None,
        )?;
        Ok(code)
    }

    /// Run a command on the remote host and return its exit code
    pub fn execute<S: AsRef<str>>(&self, command: &[S], options: &ExecuteOptions) -> RemoteResult<i32> {
        let mut formatted = prepare_shell_command(command);
        if options.dry_run {
            formatted = format!("echo {}", formatted);
        } else if !options.simple {
            formatted = self.generate_command(&formatted, &options.env);
        }

        let shell = self.remote_shell(options.verbose);
        let run = || -> RemoteResult<i32> {
            let _tunnel = if options.ports.is_empty() {
                None
            } else {
                Some(PortForwardingSession::open(
                    self.runner.as_ref(),
                    &shell,
                    &options.ports,
                )?)
            };
            shell.execute(self.runner.as_ref(), &formatted, options.raise_on_error)
        };

        if !options.stream_changes {
            return run();
        }
        let watch = WatchOptions::new(&self.local_root, self.push_rules.excludes.clone());
        let sync = options.sync_options();
        execute_on_file_change(&watch, || self.push(&sync, None), run)?
    }

    /// Send local files to the remote directory.
    ///
    /// Without `subpath` the whole tree is mirrored (minus excludes) and the
    /// remote directory is created if missing. With it, only that path is
    /// copied and the sync rules do not apply.
    pub fn push(&self, options: &SyncOptions, subpath: Option<&str>) -> RemoteResult<()> {
        let transfer = TransferOptions {
            info: options.info,
            verbose: options.verbose,
            dry_run: options.dry_run,
            delete: true,
            ..Default::default()
        };

        if let Some(subpath) = subpath {
            let target = self.subpath_target(subpath)?;
            let (src, dst) = if target.whole_dir {
                (
                    format!("{}/", target.local.display()),
                    format!("{}:{}/", self.remote.host, target.remote),
                )
            } else {
                (
                    target.local.display().to_string(),
                    format!("{}:{}/", self.remote.host, posix_parent(&target.remote)),
                )
            };
            return RsyncTransfer::transfer(
                self.runner.as_ref(),
                &src,
                &dst,
                &self.transfer_shell(),
                &transfer,
            );
        }

        let src = format!("{}/", self.local_root.display());
        let dst = self.remote.location();
        let transfer = TransferOptions {
            mirror: options.mirror,
            excludes: self.push_rules.excludes.clone(),
            includes: self.push_rules.includes.clone(),
            extra_args: vec![
                "--rsync-path".to_string(),
                format!("mkdir -p {} && rsync", self.remote.directory),
            ],
            ..transfer
        };
        RsyncTransfer::transfer(
            self.runner.as_ref(),
            &src,
            &dst,
            &self.transfer_shell(),
            &transfer,
        )
    }

    /// Bring remote files into the local workspace.
    ///
    /// Never deletes local files. With `subpath`, only that path is copied
    /// and the sync rules do not apply.
    pub fn pull(&self, options: &SyncOptions, subpath: Option<&str>) -> RemoteResult<()> {
        let transfer = TransferOptions {
            info: options.info,
            verbose: options.verbose,
            dry_run: options.dry_run,
            ..Default::default()
        };

        if let Some(subpath) = subpath {
            let target = self.subpath_target(subpath)?;
            let (src, dst_dir) = if target.whole_dir {
                (
                    format!("{}:{}/", self.remote.host, target.remote),
                    target.local,
                )
            } else {
                let dst_dir = target
                    .local
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.local_root.clone());
                (format!("{}:{}", self.remote.host, target.remote), dst_dir)
            };
            fs::create_dir_all(&dst_dir)?;
            let dst = format!("{}/", dst_dir.display());
            return RsyncTransfer::transfer(
                self.runner.as_ref(),
                &src,
                &dst,
                &self.transfer_shell(),
                &transfer,
            );
        }

        let src = format!("{}/", self.remote.location());
        let dst = self.local_root.display().to_string();
        let transfer = TransferOptions {
            excludes: self.pull_rules.excludes.clone(),
            includes: self.pull_rules.includes.clone(),
            ..transfer
        };
        RsyncTransfer::transfer(
            self.runner.as_ref(),
            &src,
            &dst,
            &self.transfer_shell(),
            &transfer,
        )
    }

    /// Remove the remote directory
    pub fn clear_remote(&self) -> RemoteResult<()> {
        self.execute_simple(&format!("rm -rf {}", self.remote.directory))
    }

    /// Create the remote directory
    pub fn create_remote(&self) -> RemoteResult<()> {
        self.execute_simple(&format!("mkdir -p {}", self.remote.directory))
    }

    fn execute_simple(&self, command: &str) -> RemoteResult<()> {
        let options = ExecuteOptions {
            simple: true,
            ..Default::default()
        };
        self.execute(&[command], &options).map(|_| ())
    }

    /// Resolve a path given relative to the invocation directory
    fn subpath_target(&self, subpath: &str) -> RemoteResult<SubpathTarget> {
        let relative = normalize_subpath(&self.relative_dir, subpath)?;
        let local = if relative == "." {
            self.local_root.clone()
        } else {
            self.local_root.join(&relative)
        };
        Ok(SubpathTarget {
            whole_dir: relative == "." || relative == self.relative_dir,
            remote: posix_join(&self.remote.directory, &relative),
            local,
        })
    }
}

/// Both ends of a single-path transfer
struct SubpathTarget {
    local: PathBuf,
    remote: String,
    /// The path is the root or the invocation directory, so its contents are
    /// synced in place rather than copied into the parent
    whole_dir: bool,
}

/// Join `subpath` onto `relative_dir` and resolve `.` and `..`.
///
/// Returns a `/`-separated path relative to the workspace root, `.` for the
/// root itself. Absolute paths and paths leaving the root are rejected.
fn normalize_subpath(relative_dir: &str, subpath: &str) -> RemoteResult<String> {
    let outside = || {
        RemoteError::InvalidInput(format!("Path '{}' is outside the workspace", subpath))
    };

    let mut parts: Vec<&str> = relative_dir
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    for component in Path::new(subpath).components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(outside)?),
            Component::ParentDir => {
                parts.pop().ok_or_else(outside)?;
            }
            Component::RootDir | Component::Prefix(_) => return Err(outside()),
        }
    }

    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}

/// `working_dir` relative to `root`, `/`-separated, `.` when equal
fn relative_posix(root: &Path, working_dir: &Path) -> RemoteResult<String> {
    let relative = working_dir.strip_prefix(root).map_err(|_| {
        RemoteError::Configuration(format!(
            "{} is not inside the workspace {}",
            working_dir.display(),
            root.display()
        ))
    })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}

fn posix_join(base: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches("./");
    if relative.is_empty() || relative == "." {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), relative)
}

fn posix_parent(path: &str) -> &str {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some(("", _)) => "/",
        Some((parent, _)) => parent,
        None => ".",
    }
}
