//! Workspace discovery
//!
//! Walks from a working directory up through its ancestors and picks the
//! first directory a configuration medium recognises.

use std::path::Path;

use tracing::debug;

use crate::domain::entities::WorkspaceConfig;
use crate::domain::ports::ConfigurationMedium;
use crate::error::{RemoteError, RemoteResult};

use super::classic::ClassicConfigurationMedium;
use super::toml_config::TomlConfigurationMedium;

/// Every known medium, in the order they are checked
pub struct Mediums {
    pub classic: ClassicConfigurationMedium,
    pub toml: TomlConfigurationMedium,
}

impl Default for Mediums {
    fn default() -> Self {
        Self {
            classic: ClassicConfigurationMedium,
            toml: TomlConfigurationMedium::new(),
        }
    }
}

impl Mediums {
    fn ordered(&self) -> [&dyn ConfigurationMedium; 2] {
        [&self.classic, &self.toml]
    }

    /// Find and load the workspace containing `working_dir`
    pub fn load_workspace_config(&self, working_dir: &Path) -> RemoteResult<WorkspaceConfig> {
        self.locate(working_dir).map(|(config, _)| config)
    }

    /// Find the workspace containing `working_dir` and load it, together
    /// with the medium it came from so changes are saved the same way.
    pub fn locate(
        &self,
        working_dir: &Path,
    ) -> RemoteResult<(WorkspaceConfig, &dyn ConfigurationMedium)> {
        for dir in working_dir.ancestors() {
            for medium in self.ordered() {
                if medium.is_workspace_root(dir) {
                    debug!("Found {} workspace at {}", medium.name(), dir.display());
                    return Ok((medium.load_config(dir)?, medium));
                }
            }
        }

        if self.toml.allows_uninitiated_workspaces() {
            debug!("Using uninitiated workspace at {}", working_dir.display());
            let medium: &dyn ConfigurationMedium = &self.toml;
            return Ok((medium.load_config(working_dir)?, medium));
        }

        Err(RemoteError::Configuration(format!(
            "Cannot resolve the remote workspace in {}",
            working_dir.display()
        )))
    }

    /// True if `dir` itself already holds a workspace configuration
    pub fn is_workspace_root(&self, dir: &Path) -> bool {
        self.ordered().into_iter().any(|m| m.is_workspace_root(dir))
    }
}

/// Load the workspace containing `working_dir` with default mediums
pub fn load_workspace_config(working_dir: &Path) -> RemoteResult<WorkspaceConfig> {
    Mediums::default().load_workspace_config(working_dir)
}
