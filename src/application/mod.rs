//! Application Layer
//!
//! Use cases that coordinate configuration, remote tools and watchers.
//!
//! - `SyncedWorkspace` - push, execute and pull against one endpoint
//! - `run_on_all` - the same operation against every endpoint in parallel

mod fanout;
mod workspace;

pub use fanout::{run_on_all, FanOutOutcome, WorkerFailure};
pub use workspace::{ExecuteOptions, SyncOptions, SyncedWorkspace, REMOTE_ENV_FILE};
