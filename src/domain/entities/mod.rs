//! Domain Entities
//!
//! - `RemoteEndpoint` - One remote host and directory with connection options
//! - `WorkspaceConfig` - Resolved configuration of a local workspace

mod endpoint;
mod workspace_config;

pub use endpoint::{RemoteEndpoint, DEFAULT_SHELL};
pub use workspace_config::WorkspaceConfig;
