//! Port forwarding session
//!
//! A background `ssh -N -L ...` process that lives exactly as long as the
//! session value.

use std::time::Duration;

use tracing::{debug, info};

use super::ssh::RemoteShell;
use crate::domain::ports::{BackgroundProcess, ProcessRunner};
use crate::domain::value_objects::{ForwardingOption, Verbosity};
use crate::error::{RemoteError, RemoteResult};

/// How long teardown waits after SIGTERM before killing the tunnel
pub const TUNNEL_TEARDOWN_TIMEOUT: Duration = Duration::from_millis(200);

/// Running tunnel process. Dropping the session tears the tunnel down.
pub struct PortForwardingSession {
    process: Box<dyn BackgroundProcess>,
}

impl PortForwardingSession {
    /// Start forwarding `ports` through `target`.
    ///
    /// The liveness check is a single probe: a live process does not prove
    /// the tunnel is usable yet, but an exited one proves it is not.
    pub fn open(
        runner: &dyn ProcessRunner,
        target: &RemoteShell,
        ports: &[ForwardingOption],
    ) -> RemoteResult<Self> {
        let shell = RemoteShell {
            force_tty: false,
            verbosity: Verbosity::Quiet,
            no_remote_command: true,
            local_port_forwarding: ports.to_vec(),
            ..target.clone()
        };
        let args = shell.command_line("");
        info!("Executing: {}", args.join(" "));

        let mut process = runner.spawn(&args, &shell.communication)?;
        if let Some(code) = process.try_wait()? {
            return Err(RemoteError::Tunneling(format!(
                "Unable to establish a ssh tunnel (exit code {})",
                code
            )));
        }
        Ok(Self { process })
    }
}

impl Drop for PortForwardingSession {
    fn drop(&mut self) {
        if let Err(e) = self.process.terminate() {
            debug!("Failed to send SIGTERM to the tunnel: {}", e);
        }
        match self.process.wait_timeout(TUNNEL_TEARDOWN_TIMEOUT) {
            Ok(true) => {}
            Ok(false) | Err(_) => {
                debug!("Tunnel did not stop after SIGTERM, killing it");
                if let Err(e) = self.process.kill() {
                    debug!("Failed to kill the tunnel: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::process::{RecordedCall, RecordingRunner};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tunnel_command_line() {
        let runner = RecordingRunner::new();
        let target = RemoteShell::new("box");
        {
            let _session =
                PortForwardingSession::open(&runner, &target, &[ForwardingOption::new(80, 8000)])
                    .unwrap();
        }

        let tunnel = strings(&[
            "ssh",
            "-Kq",
            "-o",
            "BatchMode=yes",
            "-N",
            "-L",
            "8000:localhost:80",
            "box",
        ]);
        assert_eq!(
            runner.calls(),
            vec![
                RecordedCall::Spawn(tunnel.clone()),
                RecordedCall::Terminate(tunnel),
            ]
        );
    }

    #[test]
    fn exited_tunnel_fails_to_open() {
        let runner = RecordingRunner::new().with_exited_background(255);
        let result = PortForwardingSession::open(
            &runner,
            &RemoteShell::new("box"),
            &[ForwardingOption::new(80, 80)],
        );
        assert!(matches!(result, Err(RemoteError::Tunneling(_))));
    }
}
