//! Configuration medium port - one on-disk layout of workspace settings.

use std::path::Path;

use crate::domain::entities::WorkspaceConfig;
use crate::error::RemoteResult;

/// Knows how to recognise, load and save one configuration layout.
///
/// Discovery walks ancestor directories and asks each medium whether it
/// owns the directory; the orchestration layer never sees the concrete type.
pub trait ConfigurationMedium: Send + Sync {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// True if `path` holds a workspace this medium can load
    fn is_workspace_root(&self, path: &Path) -> bool;

    /// Load the workspace rooted at `root`.
    ///
    /// Only called after `is_workspace_root(root)` returned true.
    fn load_config(&self, root: &Path) -> RemoteResult<WorkspaceConfig>;

    /// Persist `config` into `config.root`
    fn save_config(&self, config: &WorkspaceConfig) -> RemoteResult<()>;

    /// Default remote directory for a workspace that did not name one
    fn generate_remote_directory(&self, config: &WorkspaceConfig) -> RemoteResult<String>;
}
