//! Stream targets for spawned processes

use std::fs::File;
use std::sync::Arc;

/// Where one standard stream of a child process goes
#[derive(Debug, Clone, Default)]
pub enum StreamTarget {
    /// Share the stream of the current process
    #[default]
    Inherit,
    /// Discard output, or provide empty input
    Null,
    /// Redirect into an already opened file
    File(Arc<File>),
}

/// Streams handed to every process the workspace spawns.
///
/// Passed explicitly so parallel workers can write into separate log files.
#[derive(Debug, Clone, Default)]
pub struct Communication {
    pub stdin: StreamTarget,
    pub stdout: StreamTarget,
    pub stderr: StreamTarget,
}

impl Communication {
    /// Send stdout and stderr into one file and detach stdin
    pub fn to_file(file: File) -> Self {
        let file = Arc::new(file);
        Self {
            stdin: StreamTarget::Null,
            stdout: StreamTarget::File(Arc::clone(&file)),
            stderr: StreamTarget::File(file),
        }
    }
}
