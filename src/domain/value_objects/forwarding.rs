//! Local port forwarding value object

use std::fmt;

use crate::error::{RemoteError, RemoteResult};

/// One `-L` forward: traffic to `local_port` on this machine reaches
/// `remote_port` on `remote_host` as seen from the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingOption {
    pub remote_port: u16,
    pub local_port: u16,
    pub remote_host: String,
    pub local_interface: Option<String>,
}

impl ForwardingOption {
    pub fn new(remote_port: u16, local_port: u16) -> Self {
        Self {
            remote_port,
            local_port,
            remote_host: "localhost".to_string(),
            local_interface: None,
        }
    }

    /// Parse a `remotePort[:localPort]` value as typed by the user.
    ///
    /// A single port forwards to the same port number locally.
    pub fn parse(value: &str) -> RemoteResult<Self> {
        let parts: Vec<&str> = value.split(':').collect();
        if parts.len() > 2 {
            return Err(RemoteError::InvalidInput(
                "Please pass a valid value to enable local port forwarding".to_string(),
            ));
        }

        let remote_port = parse_port(parts[0])?;
        let local_port = match parts.get(1) {
            Some(local) => parse_port(local)?,
            None => remote_port,
        };
        Ok(Self::new(remote_port, local_port))
    }
}

fn parse_port(value: &str) -> RemoteResult<u16> {
    value.trim().parse::<u16>().map_err(|_| {
        RemoteError::InvalidInput("Please pass valid integer value for ports".to_string())
    })
}

impl fmt::Display for ForwardingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(interface) = &self.local_interface {
            write!(f, "{}:", interface)?;
        }
        write!(
            f,
            "{}:{}:{}",
            self.local_port, self.remote_host, self.remote_port
        )
    }
}
