//! Classic dotfile configuration
//!
//! - `.remote` (required): one `host:dir [RSHELL=.. RSHELL_OPTS='..']` per line
//! - `.remoteindex` (optional): 1-based index of the default host
//! - `.remoteignore` (optional): patterns, flat or in `pull:`/`push:`/`both:` sections

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::domain::entities::{RemoteEndpoint, WorkspaceConfig, DEFAULT_SHELL};
use crate::domain::ports::ConfigurationMedium;
use crate::domain::value_objects::SyncRules;
use crate::error::{RemoteError, RemoteResult};

use super::shared::{hashed_remote_directory, meaningful_lines, DEFAULT_REMOTE_ROOT};

pub const CONFIG_FILE_NAME: &str = ".remote";
pub const INDEX_FILE_NAME: &str = ".remoteindex";
pub const IGNORE_FILE_NAME: &str = ".remoteignore";

/// Environment variable overriding the index file (1-based)
pub const HOST_INDEX_ENV: &str = "REMOTE_HOST_INDEX";

/// Files that never leave the local machine
pub const BASE_IGNORES: [&str; 3] = [CONFIG_FILE_NAME, INDEX_FILE_NAME, IGNORE_FILE_NAME];

/// Loads and saves the classic dotfile layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassicConfigurationMedium;

impl ConfigurationMedium for ClassicConfigurationMedium {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn is_workspace_root(&self, path: &Path) -> bool {
        path.join(CONFIG_FILE_NAME).is_file()
    }

    fn load_config(&self, root: &Path) -> RemoteResult<WorkspaceConfig> {
        let configurations = load_configurations(root)?;
        let index = load_default_index(root, std::env::var(HOST_INDEX_ENV).ok())?;
        if index >= configurations.len() {
            return Err(RemoteError::Configuration(format!(
                "Configuration #{} requested but there are only {} declared",
                index + 1,
                configurations.len()
            )));
        }

        Ok(WorkspaceConfig {
            root: root.to_path_buf(),
            configurations,
            default_configuration: index,
            ignores: load_ignores(root)?,
            includes: SyncRules::default(),
        })
    }

    fn save_config(&self, config: &WorkspaceConfig) -> RemoteResult<()> {
        save_configurations(&config.root.join(CONFIG_FILE_NAME), &config.configurations)?;
        save_ignores(&config.root.join(IGNORE_FILE_NAME), &config.ignores)?;
        save_index(
            &config.root.join(INDEX_FILE_NAME),
            config.default_configuration,
        )
    }

    fn generate_remote_directory(&self, config: &WorkspaceConfig) -> RemoteResult<String> {
        Ok(hashed_remote_directory(DEFAULT_REMOTE_ROOT, &config.root))
    }
}

/// Parse one `.remote` entry, e.g. `box:.remotes/project_1a2b3c4d RSHELL=zsh`
pub fn parse_config_line(line: &str) -> RemoteResult<RemoteEndpoint> {
    let (entry, vars) = match line.split_once(char::is_whitespace) {
        Some((entry, vars)) => (entry, vars.trim()),
        None => (line, ""),
    };

    let (host, directory) = match entry.split(':').collect::<Vec<_>>()[..] {
        [host, directory] if !host.is_empty() && !directory.is_empty() => (host, directory),
        _ => {
            return Err(RemoteError::Configuration(format!(
                "The configuration string is malformed: {}. Please use host-name:remote_dir format",
                entry
            )))
        }
    };

    let mut endpoint = RemoteEndpoint::new(host, directory);
    let mut env = parse_shell_vars(line, vars)?;
    if let Some(shell) = env.remove("RSHELL") {
        endpoint.shell = shell;
    }
    if let Some(options) = env.remove("RSHELL_OPTS") {
        endpoint.shell_options = options;
    }
    if !env.is_empty() {
        let keys: Vec<_> = env.keys().cloned().collect();
        return Err(RemoteError::Configuration(format!(
            "Config line {} contains unexpected env variables: {}. Only RSHELL and RSHELL_OPTS can be used",
            line,
            keys.join(", ")
        )));
    }
    Ok(endpoint)
}

fn parse_shell_vars(line: &str, vars: &str) -> RemoteResult<BTreeMap<String, String>> {
    if vars.is_empty() {
        return Ok(BTreeMap::new());
    }

    let words = shell_words::split(vars).map_err(|_| {
        RemoteError::Configuration(format!(
            "Config line {} is corrupted. Cannot parse {}",
            line, vars
        ))
    })?;

    words
        .into_iter()
        .map(|word| match word.split_once('=') {
            Some((key, value)) => Ok((key.to_string(), value.to_string())),
            None => Err(RemoteError::Configuration(format!(
                "Config line {} is corrupted. Cannot parse {}",
                line, word
            ))),
        })
        .collect()
}

fn load_configurations(root: &Path) -> RemoteResult<Vec<RemoteEndpoint>> {
    let content = fs::read_to_string(root.join(CONFIG_FILE_NAME))?;
    meaningful_lines(&content).map(parse_config_line).collect()
}

/// Zero-based default index from the environment override or the index file
pub fn load_default_index(root: &Path, env_override: Option<String>) -> RemoteResult<usize> {
    if let Some(value) = env_override.filter(|v| !v.trim().is_empty()) {
        return parse_index(&value).ok_or_else(|| {
            RemoteError::Configuration(format!(
                "{} env variable contains symbols other than numbers: '{}'. Please set the correct index value to continue",
                HOST_INDEX_ENV, value
            ))
        });
    }

    let index_file = root.join(INDEX_FILE_NAME);
    if !index_file.exists() {
        return Ok(0);
    }
    let text = fs::read_to_string(&index_file)?;
    parse_index(text.trim()).ok_or_else(|| {
        RemoteError::Configuration(format!(
            "File {} contains symbols other than numbers: '{}'. Please remove it or replace the value to continue",
            index_file.display(),
            text.trim()
        ))
    })
}

fn parse_index(value: &str) -> Option<usize> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|i| i.checked_sub(1))
}

/// Load `.remoteignore`, always excluding the configuration files themselves
pub fn load_ignores(root: &Path) -> RemoteResult<SyncRules> {
    let mut rules = SyncRules::default();
    rules.add(BASE_IGNORES, None);

    let ignore_file = root.join(IGNORE_FILE_NAME);
    if !ignore_file.exists() {
        return Ok(rules);
    }
    let content = fs::read_to_string(&ignore_file)?;
    parse_ignores(&content, &mut rules)?;
    Ok(rules)
}

fn parse_ignores(content: &str, rules: &mut SyncRules) -> RemoteResult<()> {
    let mut section = "both";
    let mut sectioned: Option<bool> = None;

    for line in meaningful_lines(content) {
        if let Some(name) = section_header(line) {
            if sectioned == Some(false) {
                return Err(RemoteError::Configuration(format!(
                    "Few ignore patterns were listed in {} before the first section {} appeared. \
                     Please list all ignored files after a section declaration if you use new ignore format",
                    IGNORE_FILE_NAME, name
                )));
            }
            sectioned = Some(true);
            section = name;
            continue;
        }

        sectioned.get_or_insert(false);
        let list = match section {
            "pull" => &mut rules.pull,
            "push" => &mut rules.push,
            _ => &mut rules.both,
        };
        list.push(line.to_string());
    }
    rules.trim();
    Ok(())
}

/// Section name for `pull:`, `push:` and `both:` lines
fn section_header(line: &str) -> Option<&'static str> {
    let name = line.strip_suffix(':')?.trim_end();
    ["pull", "push", "both"].into_iter().find(|s| *s == name)
}

fn save_configurations(path: &Path, configurations: &[RemoteEndpoint]) -> RemoteResult<()> {
    let mut content = String::new();
    for item in configurations {
        content.push_str(&item.location());
        if item.shell != DEFAULT_SHELL {
            content.push_str(&format!(" RSHELL={}", item.shell));
        }
        if !item.shell_options.is_empty() {
            content.push_str(&format!(" RSHELL_OPTS='{}'", item.shell_options));
        }
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(())
}

fn save_ignores(path: &Path, ignores: &SyncRules) -> RemoteResult<()> {
    let mut ignores = ignores.clone();
    ignores.add(BASE_IGNORES, None);

    let mut content = String::new();
    for (name, list) in [
        ("pull", &ignores.pull),
        ("push", &ignores.push),
        ("both", &ignores.both),
    ] {
        content.push_str(name);
        content.push_str(":\n");
        for pattern in list {
            content.push_str(pattern);
            content.push('\n');
        }
    }
    fs::write(path, content)?;
    Ok(())
}

fn save_index(path: &Path, index: usize) -> RemoteResult<()> {
    if index == 0 {
        if path.exists() {
            fs::remove_file(path)?;
        }
    } else {
        fs::write(path, format!("{}\n", index + 1))?;
    }
    Ok(())
}
