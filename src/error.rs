//! Error types for remote
//!
//! Uses `thiserror` for library errors. The binary maps every variant to a
//! one-line message and an exit code at a single boundary.

use thiserror::Error;

/// Result type alias for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Exit code reported when a remote host cannot be reached
pub const CONNECTION_FAILURE_CODE: i32 = 255;

/// Main error type for remote operations
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Remote host is unreachable, or the transfer tool failed
    #[error("{0}")]
    Connection(String),

    /// Remote command ran but returned a non-zero status
    #[error("Failed to execute \"{command}\" on host {host} ({code})")]
    Execution {
        command: String,
        host: String,
        code: i32,
    },

    /// Malformed or inconsistent workspace configuration
    #[error("{0}")]
    Configuration(String),

    /// Bad user-supplied arguments
    #[error("{0}")]
    InvalidInput(String),

    /// Requested label does not match any configured host
    #[error("The label {0} cannot be found in the configuration")]
    InvalidRemoteHostLabel(String),

    /// Port forwarding process died on startup
    #[error("{0}")]
    Tunneling(String),

    /// Filesystem watcher could not be started
    #[error("{0}")]
    Watch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// Stable class name, used when reporting failures of parallel workers
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteError::Connection(_) => "ConnectionError",
            RemoteError::Execution { .. } => "ExecutionError",
            RemoteError::Configuration(_) => "ConfigurationError",
            RemoteError::InvalidInput(_) => "InvalidInputError",
            RemoteError::InvalidRemoteHostLabel(_) => "InvalidRemoteHostLabel",
            RemoteError::Tunneling(_) => "TunnelingError",
            RemoteError::Watch(_) => "WatchError",
            RemoteError::Io(_) => "IOError",
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RemoteError::Connection(_) => CONNECTION_FAILURE_CODE,
            RemoteError::Execution { code, .. } => *code,
            RemoteError::InvalidInput(_) => 2,
            _ => 1,
        }
    }
}
