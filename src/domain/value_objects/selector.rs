//! Endpoint selector

use std::fmt;

/// How the caller picked one of the configured endpoints.
///
/// `None` in place of a selector means "use the configured default".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSelector {
    /// Zero-based position in the endpoint list
    Index(usize),
    /// First endpoint carrying exactly this label
    Label(String),
}

impl fmt::Display for HostSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostSelector::Index(index) => write!(f, "#{}", index + 1),
            HostSelector::Label(label) => write!(f, "{}", label),
        }
    }
}
