// Command handlers module
pub mod check;
pub mod config;
pub mod run;
pub mod status;
pub mod version;

use anyhow::Result;
use clap::ArgMatches;
use std::path::PathBuf;

use crate::core::Config;

// Re-exports for cleaner imports
pub use version::execute as version;

/// Config file path from the global `--config` flag, or the default location
pub fn config_path(matches: &ArgMatches) -> Result<PathBuf> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => Ok(path.clone()),
        None => Config::get_config_path(),
    }
}
