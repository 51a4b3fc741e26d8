//! Remote shell invocation
//!
//! Builds deterministic `ssh` command lines and interprets their exit codes.

use tracing::info;

use super::measure_duration;
use crate::domain::entities::RemoteEndpoint;
use crate::domain::ports::ProcessRunner;
use crate::domain::value_objects::{Communication, ForwardingOption, Verbosity};
use crate::error::{RemoteError, RemoteResult, CONNECTION_FAILURE_CODE};

/// Port ssh uses when none is given
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Connection options for one `ssh` invocation.
#[derive(Debug, Clone)]
pub struct RemoteShell {
    pub host: String,
    pub port: Option<u16>,
    pub force_tty: bool,
    pub verbosity: Verbosity,
    pub use_gssapi_auth: bool,
    pub disable_password_auth: bool,
    /// Open forwards only, without running a remote command (`-N`)
    pub no_remote_command: bool,
    pub local_port_forwarding: Vec<ForwardingOption>,
    pub communication: Communication,
}

impl RemoteShell {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            force_tty: true,
            verbosity: Verbosity::Quiet,
            use_gssapi_auth: true,
            disable_password_auth: true,
            no_remote_command: false,
            local_port_forwarding: Vec::new(),
            communication: Communication::default(),
        }
    }

    /// Shell settings derived from a configured endpoint
    pub fn for_endpoint(endpoint: &RemoteEndpoint) -> Self {
        Self {
            port: endpoint.port,
            use_gssapi_auth: endpoint.supports_gssapi,
            ..Self::new(endpoint.host.clone())
        }
    }

    /// Base command line, without host and remote command
    pub fn generate_command(&self) -> Vec<String> {
        let mut command = vec!["ssh".to_string()];

        let mut cluster = String::new();
        if self.force_tty {
            cluster.push('t');
        }
        if self.use_gssapi_auth {
            cluster.push('K');
        }
        if let Some(flag) = self.verbosity.flag() {
            cluster.push(flag);
        }
        if !cluster.is_empty() {
            command.push(format!("-{}", cluster));
        }

        if self.disable_password_auth {
            command.push("-o".to_string());
            command.push("BatchMode=yes".to_string());
        }
        if let Some(port) = self.port.filter(|p| *p != DEFAULT_SSH_PORT) {
            command.push("-p".to_string());
            command.push(port.to_string());
        }
        if self.no_remote_command {
            command.push("-N".to_string());
        }
        for forward in &self.local_port_forwarding {
            command.push("-L".to_string());
            command.push(forward.to_string());
        }

        command
    }

    /// Base command as one string, suitable for `rsync -e`
    pub fn generate_command_str(&self) -> String {
        prepare_shell_command(&self.generate_command())
    }

    /// Full command line that runs `command` on the host
    pub fn command_line(&self, command: &str) -> Vec<String> {
        let mut args = self.generate_command();
        args.push(self.host.clone());
        if !command.is_empty() {
            args.push(command.to_string());
        }
        args
    }

    /// Run `command` remotely and return its exit code.
    ///
    /// ssh exits with the remote status, or 255 when it could not connect.
    /// With `raise_on_error` both cases become errors; otherwise the raw
    /// code is returned.
    pub fn execute(
        &self,
        runner: &dyn ProcessRunner,
        command: &str,
        raise_on_error: bool,
    ) -> RemoteResult<i32> {
        info!(
            "Executing:\n{} {} <<EOS\n{}EOS",
            self.generate_command().join(" "),
            self.host,
            command
        );

        let args = self.command_line(command);
        let code = measure_duration("Execution", || runner.run(&args, &self.communication))?;

        if raise_on_error {
            if code == CONNECTION_FAILURE_CODE {
                return Err(RemoteError::Connection(format!(
                    "Failed to connect to {}",
                    self.host
                )));
            } else if code != 0 {
                return Err(RemoteError::Execution {
                    command: command.to_string(),
                    host: self.host.clone(),
                    code,
                });
            }
        }
        Ok(code)
    }
}

/// Collapse command tokens into one string for a remote shell.
///
/// A single token containing a space is taken as already formatted. Otherwise
/// tokens with whitespace are quoted and the rest pass through, so remote
/// operators like `&&` or globs keep working.
pub fn prepare_shell_command<S: AsRef<str>>(tokens: &[S]) -> String {
    if let [single] = tokens {
        if single.as_ref().contains(' ') {
            return single.as_ref().to_string();
        }
    }

    tokens
        .iter()
        .map(AsRef::as_ref)
        .filter(|token| !token.is_empty())
        .map(|token| {
            if token.chars().any(char::is_whitespace) {
                shell_words::quote(token).into_owned()
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
