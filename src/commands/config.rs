use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::path::Path;

use crate::core::Config;

pub fn execute(matches: &ArgMatches, config_path: &Path, loaded: Result<Config>) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => {
            let config = loaded?;
            print!(
                "{}",
                config
                    .to_yaml_string()
                    .context("Failed to serialize config")?
            );
            Ok(())
        }
        Some(("path", _)) => {
            println!("{}", config_path.display());
            Ok(())
        }
        Some(("init", sub_matches)) => init(config_path, sub_matches.get_flag("force")),
        _ => {
            println!("Use 'lapmon config --help' for more information.");
            Ok(())
        }
    }
}

/// Write the default config, refusing to clobber a customised file unless forced
pub fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        let existing = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        let defaults = Config::default().to_yaml_string()?;
        if existing != defaults {
            println!(
                "{}",
                format!("Config file already exists: {}", config_path.display()).yellow()
            );
            println!("{}", "Use --force to overwrite it with defaults.".dimmed());
            return Ok(());
        }
    }

    Config::default().save_to(config_path)?;
    println!(
        "{}",
        format!("Default config written to {}", config_path.display())
            .green()
            .bold()
    );
    Ok(())
}
