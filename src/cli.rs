//! CLI Argument Parsing
//!
//! Flags before a bare command configure the full push, execute, pull
//! cycle. Named subcommands run one step of it, or edit the workspace.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use remote::ForwardingOption;

/// remote - work on a remote host as if it were local
#[derive(Parser, Debug)]
#[command(name = "remote")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show the remote command instead of running it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Delete remote files that are excluded locally when pushing
    #[arg(short, long)]
    pub mirror: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Forward a remote port: REMOTE[:LOCAL]
    #[arg(short, long = "tunnel", value_name = "PORTS", value_parser = parse_tunnel, conflicts_with = "multi")]
    pub tunnels: Vec<ForwardingOption>,

    /// Push local changes while the command runs
    #[arg(short = 's', long)]
    pub stream_changes: bool,

    /// Write each host's output to DIR/<timestamp>/<n>-<host>.log
    #[arg(long, value_name = "DIR")]
    pub log: Option<PathBuf>,

    /// Export KEY=VALUE before the command
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env)]
    pub env: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Host selection shared by commands that can fan out
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Use the host with this label
    #[arg(short, long)]
    pub label: Option<String>,

    /// Run on every configured host in parallel
    #[arg(long, conflicts_with = "label")]
    pub multi: bool,
}

/// Label and port attached to a new host
#[derive(Args, Debug, Clone, Default)]
pub struct HostArgs {
    /// Label to select this host with later
    #[arg(long)]
    pub label: Option<String>,

    /// SSH port
    #[arg(long)]
    pub port: Option<u16>,

    /// Connection string: host[:directory]
    #[arg(value_name = "HOST[:DIR]")]
    pub connection: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set up a new workspace in the current directory
    Init(HostArgs),

    /// Add another host to the current workspace
    Add(HostArgs),

    /// Exclude patterns from syncing
    Ignore {
        /// Only exclude when pushing
        #[arg(long, conflicts_with = "pull")]
        push: bool,

        /// Only exclude when pulling
        #[arg(long)]
        pull: bool,

        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Print the selected host
    Host {
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Choose the default host by its 1-based position
    Set { index: String },

    /// Push local files to the remote host
    Push {
        #[arg(short = 'n', long)]
        dry_run: bool,

        #[arg(short, long)]
        mirror: bool,

        #[arg(short, long)]
        verbose: bool,

        #[command(flatten)]
        target: TargetArgs,

        /// Only push these paths, relative to the current directory
        paths: Vec<String>,
    },

    /// Pull remote files into the local workspace
    Pull {
        #[arg(short = 'n', long)]
        dry_run: bool,

        #[arg(short, long)]
        verbose: bool,

        #[arg(short, long)]
        label: Option<String>,

        /// Only pull these paths, relative to the current directory
        paths: Vec<String>,
    },

    /// Run a command remotely without syncing
    Quick {
        #[arg(short = 'n', long)]
        dry_run: bool,

        #[arg(short, long)]
        verbose: bool,

        #[command(flatten)]
        target: TargetArgs,

        #[arg(short, long = "tunnel", value_name = "PORTS", value_parser = parse_tunnel, conflicts_with = "multi")]
        tunnels: Vec<ForwardingOption>,

        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Delete the remote copy of the workspace
    Delete {
        #[arg(short, long)]
        label: Option<String>,
    },

    #[command(external_subcommand)]
    External(Vec<String>),
}

impl Cli {
    /// Number of `-v` flags, counting a subcommand's own flag as one
    pub fn verbosity(&self) -> u8 {
        let nested = match &self.command {
            Some(Commands::Push { verbose, .. })
            | Some(Commands::Pull { verbose, .. })
            | Some(Commands::Quick { verbose, .. }) => u8::from(*verbose),
            _ => 0,
        };
        self.verbose.max(nested)
    }
}

fn parse_tunnel(value: &str) -> Result<ForwardingOption, String> {
    ForwardingOption::parse(value).map_err(|e| e.to_string())
}

fn parse_env(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", value)),
    }
}
