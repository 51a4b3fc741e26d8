//! Test environment builder for isolated remote testing.
//!
//! The fake `ssh` drops its options and the host name, then runs the
//! remaining words with `sh -c` from the fake remote home. rsync's `-e`
//! transport goes through the same script, so pushes and pulls are real
//! local copies.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

#[cfg(unix)]
const FAKE_SSH: &str = r#"#!/bin/sh
printf '%s\n' "$*" >> "$REMOTE_TEST_SSH_LOG"
while [ $# -gt 0 ]; do
  case "$1" in
    -o|-p|-L) shift 2 ;;
    -*) shift ;;
    *) break ;;
  esac
done
shift
cd "$REMOTE_TEST_HOME" || exit 255
exec sh -c "$*"
"#;

/// Result of running the remote CLI
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated environment: a project, a HOME and a fake remote home.
pub struct TestEnv {
    pub project_root: TempDir,
    pub home_dir: TempDir,
    pub remote_home: TempDir,
    bin_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let env = Self {
            project_root: TempDir::new().expect("project dir"),
            home_dir: TempDir::new().expect("home dir"),
            remote_home: TempDir::new().expect("remote home"),
            bin_dir: TempDir::new().expect("bin dir"),
        };
        env.install_fake_ssh();
        env
    }

    #[cfg(unix)]
    fn install_fake_ssh(&self) {
        use std::os::unix::fs::PermissionsExt;

        let path = self.bin_dir.path().join("ssh");
        fs::write(&path, FAKE_SSH).expect("write fake ssh");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake ssh");
    }

    #[cfg(not(unix))]
    fn install_fake_ssh(&self) {}

    /// Path relative to the project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Path relative to the fake remote home
    pub fn remote_path(&self, relative: &str) -> PathBuf {
        self.remote_home.path().join(relative)
    }

    pub fn write_project_file(&self, relative: &str, content: &str) {
        write_file(&self.project_path(relative), content);
    }

    pub fn write_remote_file(&self, relative: &str, content: &str) {
        write_file(&self.remote_path(relative), content);
    }

    /// Every ssh invocation so far, one line of arguments each
    pub fn ssh_log(&self) -> Vec<String> {
        fs::read_to_string(self.ssh_log_path())
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn ssh_log_path(&self) -> PathBuf {
        self.home_dir.path().join("ssh.log")
    }

    /// Run the CLI from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_from(self.project_root.path(), args)
    }

    /// Run the CLI from a specific directory
    pub fn run_from(&self, cwd: &Path, args: &[&str]) -> TestResult {
        let path = match std::env::var_os("PATH") {
            Some(path) => {
                let mut dirs = vec![self.bin_dir.path().to_path_buf()];
                dirs.extend(std::env::split_paths(&path));
                std::env::join_paths(dirs).expect("join PATH")
            }
            None => self.bin_dir.path().as_os_str().to_owned(),
        };

        let output = Command::new(env!("CARGO_BIN_EXE_remote"))
            .current_dir(cwd)
            .args(args)
            .env("HOME", self.home_dir.path())
            .env("PATH", path)
            .env("REMOTE_TEST_HOME", self.remote_home.path())
            .env("REMOTE_TEST_SSH_LOG", self.ssh_log_path())
            .env_remove("REMOTE_HOST_INDEX")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute remote");
        to_result(output)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write file");
}

fn to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// True when a real rsync binary is available for end-to-end sync tests
pub fn rsync_available() -> bool {
    Command::new("rsync")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
