//! Process runner backed by `std::process`.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::ports::{BackgroundProcess, ProcessRunner, SIGNAL_EXIT_BASE};
use crate::domain::value_objects::{Communication, StreamTarget};

/// Polling step used while waiting for a background process to exit
const WAIT_POLL: Duration = Duration::from_millis(10);

/// Production runner that spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(args: &[String], communication: &Communication) -> io::Result<Command> {
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

        let mut cmd = Command::new(program);
        cmd.args(rest)
            .stdin(stdio(&communication.stdin)?)
            .stdout(stdio(&communication.stdout)?)
            .stderr(stdio(&communication.stderr)?);
        Ok(cmd)
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, args: &[String], communication: &Communication) -> io::Result<i32> {
        let status = Self::command(args, communication)?.status()?;
        Ok(exit_code(status))
    }

    fn spawn(
        &self,
        args: &[String],
        communication: &Communication,
    ) -> io::Result<Box<dyn BackgroundProcess>> {
        let child = Self::command(args, communication)?.spawn()?;
        debug!("Spawned background process {}", child.id());
        Ok(Box::new(SystemProcess { child }))
    }
}

fn stdio(target: &StreamTarget) -> io::Result<Stdio> {
    Ok(match target {
        StreamTarget::Inherit => Stdio::inherit(),
        StreamTarget::Null => Stdio::null(),
        StreamTarget::File(file) => Stdio::from(file.try_clone()?),
    })
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| SIGNAL_EXIT_BASE + signal))
        .unwrap_or(SIGNAL_EXIT_BASE)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(SIGNAL_EXIT_BASE)
}

struct SystemProcess {
    child: Child,
}

impl BackgroundProcess for SystemProcess {
    fn try_wait(&mut self) -> io::Result<Option<i32>> {
        Ok(self.child.try_wait()?.map(exit_code))
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> io::Result<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        let pid = self.child.id() as libc::pid_t;
        // SAFETY: the pid belongs to a child we have not reaped yet
        let ret = unsafe { libc::kill(pid, libc::SIGTERM) };
        if ret == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> io::Result<()> {
        self.child.kill()
    }

    fn wait_timeout(&mut self, timeout: Duration) -> io::Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.child.try_wait()?.is_some() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(WAIT_POLL);
        }
    }

    fn kill(&mut self) -> io::Result<()> {
        if self.child.try_wait()?.is_none() {
            self.child.kill()?;
        }
        self.child.wait().map(|_| ())
    }
}
