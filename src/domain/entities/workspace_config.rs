//! Workspace configuration entity

use std::path::PathBuf;

use super::endpoint::RemoteEndpoint;
use crate::domain::value_objects::SyncRules;

/// Fully resolved configuration of one local workspace.
///
/// Produced by a configuration medium; the orchestration layer only ever
/// consumes this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Absolute path to the workspace root
    pub root: PathBuf,
    pub configurations: Vec<RemoteEndpoint>,
    /// Zero-based index into `configurations`
    pub default_configuration: usize,
    /// Patterns excluded from transfers
    pub ignores: SyncRules,
    /// Patterns force-included in transfers even when excluded
    pub includes: SyncRules,
}

impl WorkspaceConfig {
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            configurations: Vec::new(),
            default_configuration: 0,
            ignores: SyncRules::default(),
            includes: SyncRules::default(),
        }
    }

    /// Append an endpoint unless one with the same host and directory exists.
    ///
    /// Returns whether it was added, and its index either way.
    pub fn add_remote_host(&mut self, endpoint: RemoteEndpoint) -> (bool, usize) {
        if let Some(index) = self
            .configurations
            .iter()
            .position(|c| c.host == endpoint.host && c.directory == endpoint.directory)
        {
            return (false, index);
        }
        self.configurations.push(endpoint);
        (true, self.configurations.len() - 1)
    }
}
