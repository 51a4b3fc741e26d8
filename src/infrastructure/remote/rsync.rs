//! Rsync transfer
//!
//! Builds one `rsync` invocation between a local path and a `host:path`
//! location, with the remote shell command as its transport.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;
use tracing::info;

use super::measure_duration;
use super::ssh::RemoteShell;
use crate::domain::ports::ProcessRunner;
use crate::error::{RemoteError, RemoteResult};

/// Flags for a single transfer
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Itemize changes (`-i`)
    pub info: bool,
    pub verbose: bool,
    pub dry_run: bool,
    /// Delete destination files missing from the source
    pub delete: bool,
    /// Also delete excluded destination files, after the transfer
    pub mirror: bool,
    pub excludes: Vec<String>,
    pub includes: Vec<String>,
    pub extra_args: Vec<String>,
}

/// Transfer strategy using rsync
pub struct RsyncTransfer;

impl RsyncTransfer {
    /// Check if rsync is installed and available
    pub fn check_available() -> bool {
        Command::new("rsync")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Copy `src` into `dst`.
    ///
    /// A directory `src` ending with `/` copies its contents rather than the
    /// directory itself. Pattern files live until this call returns, on
    /// every path.
    pub fn transfer(
        runner: &dyn ProcessRunner,
        src: &str,
        dst: &str,
        shell: &RemoteShell,
        options: &TransferOptions,
    ) -> RemoteResult<()> {
        info!("Sync files from {} to {}", src, dst);

        let mut args = base_args(shell, options);
        let mut pattern_files = Vec::new();
        // includes must precede excludes, rsync stops at the first matching rule
        for (flag, patterns) in [
            ("--include-from", &options.includes),
            ("--exclude-from", &options.excludes),
        ] {
            if let Some(file) = write_patterns(flag, patterns)? {
                args.push(flag.to_string());
                args.push(file.path().display().to_string());
                pattern_files.push(file);
            }
        }
        args.push(src.to_string());
        args.push(dst.to_string());

        info!("Starting sync with command {}", args.join(" "));
        let code = measure_duration("Sync", || runner.run(&args, &shell.communication));
        drop(pattern_files);

        if code? != 0 {
            return Err(RemoteError::Connection(format!(
                "Failed to sync files between {} and {}. Is remote host reachable?",
                src, dst
            )));
        }
        Ok(())
    }
}

fn base_args(shell: &RemoteShell, options: &TransferOptions) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "rsync".into(),
        "-arlpmchz".into(),
        "--copy-unsafe-links".into(),
        "-e".into(),
        shell.generate_command_str(),
        "--force".into(),
    ];
    if options.info {
        args.push("-i".into());
    }
    if options.verbose {
        args.push("-v".into());
    }
    if options.dry_run {
        args.push("-n".into());
    }
    if options.delete || options.mirror {
        args.push("--delete".into());
    }
    if options.mirror {
        args.push("--delete-after".into());
        args.push("--delete-excluded".into());
    }
    args.extend(options.extra_args.iter().cloned());
    args
}

fn write_patterns(flag: &str, patterns: &[String]) -> RemoteResult<Option<NamedTempFile>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut file = tempfile::Builder::new().prefix("remote.").tempfile()?;
    for pattern in patterns {
        writeln!(file, "{}", pattern)?;
    }
    file.flush()?;
    info!("{} patterns:\n{}", flag, patterns.join("\n"));
    Ok(Some(file))
}
