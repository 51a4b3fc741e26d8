//! Command handlers for the `remote` binary
//!
//! Every handler returns the process exit code. Errors bubble up to
//! `main`, which prints them and maps them to an exit code.

mod init;
mod run;
mod settings;
mod sync;
mod targets;

use anyhow::Result;

use crate::cli::{Cli, Commands};

/// Run the command selected on the command line
pub fn dispatch(cli: Cli) -> Result<i32> {
    let Cli {
        dry_run,
        mirror,
        verbose,
        target,
        tunnels,
        stream_changes,
        log,
        env,
        command,
    } = cli;

    match command {
        None => {
            eprintln!("error: missing command to run remotely");
            eprintln!("Usage: remote [OPTIONS] <COMMAND>...");
            Ok(2)
        }
        Some(Commands::External(command)) => run::cmd_run(
            &command,
            run::RunFlags {
                dry_run,
                mirror,
                verbose: verbose > 0,
                tunnels,
                stream_changes,
                env: env.into_iter().collect(),
                log,
            },
            &target,
        ),
        Some(Commands::Init(host)) => init::cmd_init(&host),
        Some(Commands::Add(host)) => init::cmd_add(&host),
        Some(Commands::Ignore {
            push,
            pull,
            patterns,
        }) => settings::cmd_ignore(&patterns, push, pull),
        Some(Commands::Host { label }) => settings::cmd_host(label),
        Some(Commands::Set { index }) => settings::cmd_set(&index),
        Some(Commands::Push {
            dry_run,
            mirror,
            verbose,
            target,
            paths,
        }) => sync::cmd_push(dry_run, mirror, verbose, &target, &paths),
        Some(Commands::Pull {
            dry_run,
            verbose,
            label,
            paths,
        }) => sync::cmd_pull(dry_run, verbose, label, &paths),
        Some(Commands::Quick {
            dry_run,
            verbose,
            target,
            tunnels,
            command,
        }) => run::cmd_quick(&command, dry_run, verbose, tunnels, &target),
        Some(Commands::Delete { label }) => sync::cmd_delete(label),
    }
}
