//! Sync rules value object
//!
//! Three pattern categories (pull-only, push-only, both) that compile into
//! per-direction pattern lists handed to the transfer tool.

use std::collections::BTreeSet;

/// Transfer direction a pattern applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Push,
    Pull,
}

/// Pattern lists for one workspace.
///
/// Mutating operations keep every list sorted and free of duplicates, so
/// compiled output (and every command line built from it) is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRules {
    pub pull: Vec<String>,
    pub push: Vec<String>,
    pub both: Vec<String>,
}

impl SyncRules {
    pub fn new(pull: Vec<String>, push: Vec<String>, both: Vec<String>) -> Self {
        let mut rules = Self { pull, push, both };
        rules.trim();
        rules
    }

    /// Patterns that apply when sending files to the remote host
    pub fn compile_push(&self) -> Vec<String> {
        compile(&self.push, &self.both)
    }

    /// Patterns that apply when fetching files from the remote host
    pub fn compile_pull(&self) -> Vec<String> {
        compile(&self.pull, &self.both)
    }

    /// Add patterns to one direction, or to `both` when no direction is given
    pub fn add<I, S>(&mut self, patterns: I, direction: Option<Direction>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = match direction {
            Some(Direction::Push) => &mut self.push,
            Some(Direction::Pull) => &mut self.pull,
            None => &mut self.both,
        };
        target.extend(patterns.into_iter().map(Into::into));
        self.trim();
    }

    /// Sort and deduplicate every list in place
    pub fn trim(&mut self) {
        for list in [&mut self.pull, &mut self.push, &mut self.both] {
            list.sort();
            list.dedup();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pull.is_empty() && self.push.is_empty() && self.both.is_empty()
    }
}

fn compile(direction: &[String], both: &[String]) -> Vec<String> {
    direction
        .iter()
        .chain(both.iter())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Compiled exclude/include lists for one transfer direction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledRules {
    pub excludes: Vec<String>,
    pub includes: Vec<String>,
}
