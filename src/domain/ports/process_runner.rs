//! Process runner port - abstracts spawning of external tools.
//!
//! Every call to rsync or ssh goes through this trait, so orchestration can
//! be exercised with a recording double instead of real network tools.

use std::io;
use std::time::Duration;

use crate::domain::value_objects::Communication;

/// Added to the signal number to form the exit code of a signalled child,
/// following the shell convention (`130` for SIGINT)
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// Runs external programs given as full argument vectors (`args[0]` is the program).
pub trait ProcessRunner: Send + Sync {
    /// Run to completion and return the exit code
    fn run(&self, args: &[String], communication: &Communication) -> io::Result<i32>;

    /// Start in the background and return a handle to it
    fn spawn(
        &self,
        args: &[String],
        communication: &Communication,
    ) -> io::Result<Box<dyn BackgroundProcess>>;
}

/// Handle to a process started with [`ProcessRunner::spawn`].
pub trait BackgroundProcess: Send {
    /// Exit code if the process has already finished
    fn try_wait(&mut self) -> io::Result<Option<i32>>;

    /// Ask the process to stop (SIGTERM where available)
    fn terminate(&mut self) -> io::Result<()>;

    /// Wait up to `timeout` for the process to exit; `true` if it did
    fn wait_timeout(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Force the process to stop and reap it
    fn kill(&mut self) -> io::Result<()>;
}
