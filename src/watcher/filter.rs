//! Change filter
//!
//! Decides whether a filesystem event touches anything the push would
//! transfer, using gitignore-style matching of the push excludes.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::warn;

/// Compiled exclude patterns, rooted at the workspace root.
#[derive(Debug)]
pub struct ChangeFilter {
    roots: Vec<PathBuf>,
    matcher: Gitignore,
}

impl ChangeFilter {
    /// Build a matcher from exclude patterns.
    ///
    /// Patterns the matcher cannot parse are skipped with a warning; they
    /// only widen what triggers a resync.
    pub fn new(root: &Path, patterns: &[String]) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                warn!("Pattern '{}' is not usable for watching: {}", pattern, e);
            }
        }
        let matcher = builder.build().unwrap_or_else(|e| {
            warn!("Failed to build watch filter: {}", e);
            Gitignore::empty()
        });

        let mut roots = vec![root.to_path_buf()];
        if let Ok(canonical) = root.canonicalize() {
            if canonical != root {
                roots.push(canonical);
            }
        }
        Self { roots, matcher }
    }

    /// True if a change at `path` does not need a resync
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(relative) = self
            .roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok())
        else {
            return false;
        };
        if relative.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(relative, path.is_dir())
            .is_ignore()
    }

    /// True if every path of an event is ignored
    pub fn all_ignored(&self, paths: &[PathBuf]) -> bool {
        !paths.is_empty() && paths.iter().all(|p| self.is_ignored(p))
    }
}
