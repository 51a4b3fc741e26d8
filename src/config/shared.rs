//! Helpers shared by the configuration mediums

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::{RemoteError, RemoteResult};

/// Remote directory that holds generated workspace directories
pub const DEFAULT_REMOTE_ROOT: &str = ".remotes";

static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-\w.]+@)?[-\w]+(\.[-\w]+)*$").expect("host pattern is valid")
});

static PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/?[-.\w\s~]+(/[-.\w\s]+)*/?$").expect("path pattern is valid")
});

/// True if `host` is a plain host name, optionally with a `user@` prefix
pub fn is_valid_host(host: &str) -> bool {
    HOST_PATTERN.is_match(host)
}

/// Split and validate a `host[:directory]` connection string
pub fn parse_connection_string(connection: &str) -> RemoteResult<(String, Option<String>)> {
    let invalid = || {
        RemoteError::InvalidInput(format!(
            "Invalid connection string '{}'. Please use 'host-name[:remote_dir]' format",
            connection
        ))
    };

    let (host, directory) = match connection.split_once(':') {
        Some((host, directory)) => (host, Some(directory)),
        None => (connection, None),
    };
    if !is_valid_host(host) {
        return Err(invalid());
    }
    match directory {
        Some(dir) if !PATH_PATTERN.is_match(dir) => Err(invalid()),
        _ => Ok((host.to_string(), directory.map(str::to_string))),
    }
}

/// Short stable fingerprint of a local path
pub fn hash_path(path: &Path) -> String {
    let digest = Sha256::digest(path.to_string_lossy().as_bytes());
    format!("{:x}", digest)[..8].to_string()
}

/// `<remote_root>/<dir name>_<hash>` for a workspace root
pub fn hashed_remote_directory(remote_root: &str, root: &Path) -> String {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
    format!(
        "{}/{}_{}",
        remote_root.trim_end_matches('/'),
        name,
        hash_path(root)
    )
}

/// Read non-empty, non-comment lines of a text file
pub fn meaningful_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}
