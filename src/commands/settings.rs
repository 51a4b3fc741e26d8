//! `ignore`, `host` and `set`

use anyhow::Result;

use remote::config::Mediums;
use remote::{Direction, RemoteError};

use super::targets;

pub fn cmd_ignore(patterns: &[String], push: bool, pull: bool) -> Result<i32> {
    let direction = match (push, pull) {
        (true, _) => Some(Direction::Push),
        (_, true) => Some(Direction::Pull),
        _ => None,
    };

    let mediums = Mediums::default();
    let (mut config, medium) = mediums.locate(&std::env::current_dir()?)?;
    config.ignores.add(patterns.iter().cloned(), direction);
    medium.save_config(&config)?;
    Ok(0)
}

pub fn cmd_host(label: Option<String>) -> Result<i32> {
    let workspace = targets::single(label)?;
    println!("{}", workspace.remote.host);
    Ok(0)
}

pub fn cmd_set(index: &str) -> Result<i32> {
    let index: i64 = index
        .trim()
        .parse()
        .map_err(|_| RemoteError::InvalidInput(format!("Invalid index '{}'", index)))?;

    let mediums = Mediums::default();
    let (mut config, medium) = mediums.locate(&std::env::current_dir()?)?;
    let available = config.configurations.len();
    if index < 1 {
        return Err(RemoteError::InvalidInput("Index should be 1 or higher".to_string()).into());
    }
    if index as usize > available {
        return Err(RemoteError::InvalidInput(format!(
            "Index is too big ({}). Only have {} hosts to choose from.",
            index, available
        ))
        .into());
    }

    let index = index as usize - 1;
    config.default_configuration = index;
    medium.save_config(&config)?;
    println!("Remote host is set to {}", config.configurations[index].host);
    Ok(0)
}
