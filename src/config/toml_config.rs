//! TOML configuration
//!
//! Three layers, merged field by field:
//! 1. `.remote.toml` in the workspace root (highest priority)
//! 2. `.remoteignore.toml` in the workspace root
//! 3. `~/.config/remote/defaults.toml` (machine-wide)
//!
//! A value set in a higher layer replaces the lower one; an `[extends]`
//! block appends to it instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::{RemoteEndpoint, WorkspaceConfig};
use crate::domain::ports::ConfigurationMedium;
use crate::domain::value_objects::SyncRules;
use crate::error::{RemoteError, RemoteResult};

use super::shared::{hashed_remote_directory, is_valid_host, meaningful_lines, DEFAULT_REMOTE_ROOT};

pub const WORKSPACE_CONFIG: &str = ".remote.toml";
pub const WORKSPACE_SYNC_CONFIG: &str = ".remoteignore.toml";
pub const GLOBAL_CONFIG: &str = ".config/remote/defaults.toml";

fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn default_remote_root() -> String {
    DEFAULT_REMOTE_ROOT.to_string()
}

/// One `[[hosts]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Disable for hosts without gssapi-* auth, or connecting may stall
    #[serde(default = "default_true")]
    pub supports_gssapi_auth: bool,
}

/// `[push]`, `[pull]` or `[both]` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncRulesConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(
        default,
        alias = "include_vsc_ignore_patterns",
        skip_serializing_if = "Option::is_none"
    )]
    pub include_vcs_ignore_patterns: Option<bool>,
}

/// Rule blocks shared by every layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateSyncRulesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub both: Option<SyncRulesConfig>,
}

/// Hosts plus rule blocks: everything one work cycle needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkCycleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<ConnectionConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub both: Option<SyncRulesConfig>,
}

/// `.remote.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<ConnectionConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub both: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<WorkCycleConfig>,
}

/// `.remoteignore.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalSyncRulesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub both: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<AggregateSyncRulesConfig>,
}

/// `[general]` block of the machine-wide file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default)]
    pub allow_uninitiated_workspaces: bool,
    #[serde(default)]
    pub use_relative_remote_paths: bool,
    #[serde(default = "default_remote_root")]
    pub remote_root: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            allow_uninitiated_workspaces: false,
            use_relative_remote_paths: false,
            remote_root: default_remote_root(),
        }
    }
}

/// `~/.config/remote/defaults.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<ConnectionConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull: Option<SyncRulesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub both: Option<SyncRulesConfig>,
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Values that an `[extends]` block appends to
trait Extendable {
    fn extend_with(&mut self, other: Self);
}

impl Extendable for Vec<ConnectionConfig> {
    fn extend_with(&mut self, other: Self) {
        self.extend(other);
    }
}

impl Extendable for SyncRulesConfig {
    fn extend_with(&mut self, other: Self) {
        self.exclude.extend(other.exclude);
        self.include.extend(other.include);
        if other.include_vcs_ignore_patterns.is_some() {
            self.include_vcs_ignore_patterns = other.include_vcs_ignore_patterns;
        }
    }
}

/// Merge one field across layers, lowest priority first.
///
/// Each layer is `(value, extension)`: a set value replaces the result, an
/// extension appends to it (or becomes it when nothing was set yet).
fn merge_field<T: Extendable>(base: Option<T>, layers: Vec<(Option<T>, Option<T>)>) -> Option<T> {
    let mut result = base;
    for (value, extension) in layers {
        if value.is_some() {
            result = value;
        }
        if let Some(extension) = extension {
            match result.as_mut() {
                Some(current) => current.extend_with(extension),
                None => result = Some(extension),
            }
        }
    }
    result
}

fn load_file<T: DeserializeOwned + Default>(path: &Path) -> RemoteResult<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        RemoteError::Configuration(format!(
            "Invalid value in configuration file {}:\n{}",
            path.display(),
            e
        ))
    })
}

fn validate_hosts(path: &Path, hosts: Option<&Vec<ConnectionConfig>>, global: bool) -> RemoteResult<()> {
    let Some(hosts) = hosts else {
        return Ok(());
    };
    let invalid = |reason: String| {
        RemoteError::Configuration(format!(
            "Invalid value in configuration file {}:\n  - hosts: {}",
            path.display(),
            reason
        ))
    };

    if hosts.iter().filter(|h| h.default).count() > 1 {
        return Err(invalid("can only have one default".to_string()));
    }
    for host in hosts {
        if !is_valid_host(&host.host) {
            return Err(invalid(format!("{} must be a valid host name", host.host)));
        }
        if matches!(host.port, Some(port) if port < 2) {
            return Err(invalid(format!("{} has an invalid port", host.host)));
        }
        if global && host.directory.is_some() {
            return Err(invalid(
                "cannot specify directory in global host config".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn load_global_config(path: &Path) -> RemoteResult<GlobalConfig> {
    let config: GlobalConfig = load_file(path)?;
    validate_hosts(path, config.hosts.as_ref(), true)?;
    Ok(config)
}

pub fn load_local_config(root: &Path) -> RemoteResult<LocalConfig> {
    let path = root.join(WORKSPACE_CONFIG);
    let config: LocalConfig = load_file(&path)?;
    validate_hosts(&path, config.hosts.as_ref(), false)?;

    if let Some(extends) = &config.extends {
        validate_hosts(&path, extends.hosts.as_ref(), false)?;
        let duplicates: Vec<&str> = [
            ("hosts", config.hosts.is_some() && extends.hosts.is_some()),
            ("push", config.push.is_some() && extends.push.is_some()),
            ("pull", config.pull.is_some() && extends.pull.is_some()),
            ("both", config.both.is_some() && extends.both.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, duplicate)| duplicate.then_some(name))
        .collect();

        if !duplicates.is_empty() {
            return Err(RemoteError::Configuration(format!(
                "Following fields are specified in for overwrite and extend in {} file: {}.",
                path.display(),
                duplicates.join(",")
            )));
        }
    }
    Ok(config)
}

pub fn load_local_ignores_config(root: &Path) -> RemoteResult<LocalSyncRulesConfig> {
    load_file(&root.join(WORKSPACE_SYNC_CONFIG))
}

/// Merge the three layers into one work cycle description
pub fn merge_configs(
    global: &GlobalConfig,
    local: LocalConfig,
    ignores: LocalSyncRulesConfig,
) -> WorkCycleConfig {
    let local_extends = local.extends.unwrap_or_default();
    let ignores_extends = ignores.extends.unwrap_or_default();

    WorkCycleConfig {
        hosts: merge_field(
            global.hosts.clone(),
            vec![(local.hosts, local_extends.hosts)],
        ),
        push: merge_field(
            global.push.clone(),
            vec![
                (local.push, local_extends.push),
                (ignores.push, ignores_extends.push),
            ],
        ),
        pull: merge_field(
            global.pull.clone(),
            vec![
                (local.pull, local_extends.pull),
                (ignores.pull, ignores_extends.pull),
            ],
        ),
        both: merge_field(
            global.both.clone(),
            vec![
                (local.both, local_extends.both),
                (ignores.both, ignores_extends.both),
            ],
        ),
    }
}

/// Exclude patterns of a block, plus `.gitignore` lines when asked for
fn excludes(rules: Option<&SyncRulesConfig>, root: &Path) -> RemoteResult<Vec<String>> {
    let Some(rules) = rules else {
        return Ok(Vec::new());
    };
    let mut exclude = rules.exclude.clone();

    let gitignore = root.join(".gitignore");
    if rules.include_vcs_ignore_patterns == Some(true) && gitignore.exists() {
        let content = fs::read_to_string(&gitignore)?;
        exclude.extend(meaningful_lines(&content).map(str::to_string));
    }
    Ok(exclude)
}

fn includes(rules: Option<&SyncRulesConfig>) -> Vec<String> {
    rules.map(|r| r.include.clone()).unwrap_or_default()
}

/// Loads and saves the layered TOML layout.
#[derive(Debug)]
pub struct TomlConfigurationMedium {
    home: Option<PathBuf>,
    global: OnceLock<GlobalConfig>,
}

impl Default for TomlConfigurationMedium {
    fn default() -> Self {
        Self::new()
    }
}

impl TomlConfigurationMedium {
    pub fn new() -> Self {
        Self::with_home(dirs::home_dir())
    }

    /// Resolve the machine-wide file under `home` instead of the user's home
    pub fn with_home(home: Option<PathBuf>) -> Self {
        Self {
            home,
            global: OnceLock::new(),
        }
    }

    /// Machine-wide settings, read once on first use
    pub fn global_config(&self) -> RemoteResult<&GlobalConfig> {
        if let Some(config) = self.global.get() {
            return Ok(config);
        }
        let loaded = match &self.home {
            Some(home) => load_global_config(&home.join(GLOBAL_CONFIG))?,
            None => GlobalConfig::default(),
        };
        Ok(self.global.get_or_init(|| loaded))
    }

    /// True if directories without any marker may be used as workspaces
    pub fn allows_uninitiated_workspaces(&self) -> bool {
        self.global_config()
            .map(|g| g.general.allow_uninitiated_workspaces)
            .unwrap_or(false)
    }

    fn remote_directory_for(&self, root: &Path) -> RemoteResult<String> {
        let general = &self.global_config()?.general;
        if !general.use_relative_remote_paths {
            return Ok(hashed_remote_directory(&general.remote_root, root));
        }

        let relative = self
            .home
            .as_deref()
            .and_then(|home| root.strip_prefix(home).ok())
            .or_else(|| root.strip_prefix("/").ok())
            .unwrap_or(root);
        let mut directory = general.remote_root.trim_end_matches('/').to_string();
        for component in relative.components() {
            directory.push('/');
            directory.push_str(&component.as_os_str().to_string_lossy());
        }
        Ok(directory)
    }
}

impl ConfigurationMedium for TomlConfigurationMedium {
    fn name(&self) -> &'static str {
        "toml"
    }

    fn is_workspace_root(&self, path: &Path) -> bool {
        path.join(WORKSPACE_CONFIG).is_file()
    }

    fn load_config(&self, root: &Path) -> RemoteResult<WorkspaceConfig> {
        let local = load_local_config(root)?;
        let local_ignores = load_local_ignores_config(root)?;
        let merged = merge_configs(self.global_config()?, local, local_ignores);

        let hosts = merged.hosts.clone().unwrap_or_default();
        if hosts.is_empty() {
            return Err(RemoteError::Configuration(
                "You need to provide at least one remote host to connect".to_string(),
            ));
        }

        let mut configurations = Vec::with_capacity(hosts.len());
        let mut default_configuration = 0;
        for (index, connection) in hosts.into_iter().enumerate() {
            if connection.default {
                default_configuration = index;
            }
            let directory = match connection.directory {
                Some(directory) => directory,
                None => self.remote_directory_for(root)?,
            };
            configurations.push(RemoteEndpoint {
                port: connection.port,
                label: connection.label,
                supports_gssapi: connection.supports_gssapi_auth,
                ..RemoteEndpoint::new(connection.host, directory)
            });
        }

        let mut both_excludes = excludes(merged.both.as_ref(), root)?;
        both_excludes.push(WORKSPACE_CONFIG.to_string());
        let ignores = SyncRules::new(
            excludes(merged.pull.as_ref(), root)?,
            excludes(merged.push.as_ref(), root)?,
            both_excludes,
        );
        let includes = SyncRules::new(
            includes(merged.pull.as_ref()),
            includes(merged.push.as_ref()),
            includes(merged.both.as_ref()),
        );
        debug!("Loaded {} hosts from {}", configurations.len(), root.display());

        Ok(WorkspaceConfig {
            root: root.to_path_buf(),
            configurations,
            default_configuration,
            ignores,
            includes,
        })
    }

    fn save_config(&self, config: &WorkspaceConfig) -> RemoteResult<()> {
        let mut ignores = config.ignores.clone();
        ignores.add([WORKSPACE_CONFIG], None);

        let hosts = config
            .configurations
            .iter()
            .enumerate()
            .map(|(index, endpoint)| ConnectionConfig {
                host: endpoint.host.clone(),
                port: endpoint.port,
                directory: Some(endpoint.directory.clone()),
                default: index == config.default_configuration,
                label: endpoint.label.clone(),
                supports_gssapi_auth: endpoint.supports_gssapi,
            })
            .collect();

        let block = |exclude: &[String], include: &[String]| {
            (!exclude.is_empty() || !include.is_empty()).then(|| SyncRulesConfig {
                exclude: exclude.to_vec(),
                include: include.to_vec(),
                include_vcs_ignore_patterns: None,
            })
        };
        let local = LocalConfig {
            hosts: Some(hosts),
            push: block(&ignores.push, &config.includes.push),
            pull: block(&ignores.pull, &config.includes.pull),
            both: block(&ignores.both, &config.includes.both),
            extends: None,
        };

        let content = toml::to_string(&local).map_err(|e| {
            RemoteError::Configuration(format!("Failed to serialize {}: {}", WORKSPACE_CONFIG, e))
        })?;
        fs::write(config.root.join(WORKSPACE_CONFIG), content)?;
        Ok(())
    }

    fn generate_remote_directory(&self, config: &WorkspaceConfig) -> RemoteResult<String> {
        self.remote_directory_for(&config.root)
    }
}
