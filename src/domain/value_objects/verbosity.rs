//! Output verbosity of spawned remote tools

/// Maps to the remote shell flag cluster: `q`, nothing, or `v`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Quiet,
    Default,
    Verbose,
}

impl Verbosity {
    pub fn from_flag(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }

    /// Letter appended to the flag cluster, if any
    pub fn flag(self) -> Option<char> {
        match self {
            Verbosity::Quiet => Some('q'),
            Verbosity::Default => None,
            Verbosity::Verbose => Some('v'),
        }
    }
}
