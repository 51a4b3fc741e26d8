//! remote - work on a remote host as if it were local
//!
//! Keeps a local workspace and a directory on a remote host in sync with
//! rsync, and runs commands there over ssh: push, execute, pull.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod watcher;

// Re-exports for convenience
pub use application::{
    run_on_all, ExecuteOptions, FanOutOutcome, SyncOptions, SyncedWorkspace, WorkerFailure,
};
pub use domain::entities::{RemoteEndpoint, WorkspaceConfig};
pub use domain::value_objects::{
    Communication, CompiledRules, Direction, ForwardingOption, HostSelector, StreamTarget,
    SyncRules, Verbosity,
};
pub use error::{RemoteError, RemoteResult};
