//! remote CLI - sync a workspace to a remote host and run commands there
//!
//! Usage: remote [OPTIONS] <COMMAND>...
//!
//! Commands:
//!   init    Set up a workspace in the current directory
//!   add     Add another host
//!   push    Push local files
//!   pull    Pull remote files
//!   quick   Run a command without syncing

mod cli;
mod commands;
mod ui;

use clap::Parser;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();
    ui::logging::init(cli.verbosity());

    let code = match commands::dispatch(cli) {
        Ok(code) => code,
        Err(err) => ui::error::report(&err),
    };
    std::process::exit(code);
}
