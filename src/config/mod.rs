//! Configuration layer
//!
//! Two on-disk layouts resolve into one `WorkspaceConfig`:
//! 1. Classic dotfiles (`.remote`, `.remoteindex`, `.remoteignore`)
//! 2. Layered TOML (`.remote.toml`, `.remoteignore.toml`, `~/.config/remote/defaults.toml`)
//!
//! Discovery walks ancestor directories; the closest marker wins.

pub mod classic;
mod discovery;
mod shared;
#[cfg(test)]
mod tests;
pub mod toml_config;

pub use classic::ClassicConfigurationMedium;
pub use discovery::{load_workspace_config, Mediums};
pub use shared::{hash_path, is_valid_host, parse_connection_string, DEFAULT_REMOTE_ROOT};
pub use toml_config::TomlConfigurationMedium;
