//! Command dispatch and handler modules.

mod classpath;
mod order;

use std::path::{Path, PathBuf};

use miette::Result;

use plinth_core::config::GlobalConfig;
use plinth_ops::ops_platform::{self, Platform};
use plinth_util::errors::PlinthError;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Classpath(args) => classpath::exec(args, cli.config.as_deref()),
        Command::Order(args) => order::exec(args, cli.config.as_deref()),
    }
}

fn current_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir().map_err(PlinthError::Io)?)
}

/// Load the global config and the platform the command operates on.
fn load_platform(explicit: Option<&Path>, config: Option<&Path>) -> Result<Platform> {
    let global = match config {
        Some(path) => GlobalConfig::load_from(path)?,
        None => GlobalConfig::load()?,
    };
    let path = ops_platform::find_platform(explicit, &current_dir()?)?;
    ops_platform::load_platform(&path, &global)
}
