use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

use lapmon::commands;
use lapmon::{Config, LoggingConfig};

fn main() -> Result<()> {
    let matches = Command::new("lapmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watches CPU, memory and disk usage and raises alerts when thresholds are crossed")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to the config file")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Start monitoring in the foreground")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("SECONDS")
                        .help("Override the monitoring interval")
                        .value_parser(value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .help("Only write alerts to the log")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Show current system metrics")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the snapshot as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Evaluate the thresholds once against current metrics")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the alerts as JSON")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("ignore-quiet-hours")
                        .long("ignore-quiet-hours")
                        .help("Evaluate even inside the quiet-hours window")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(
                    Command::new("init").about("Write the default configuration").arg(
                        Arg::new("force")
                            .short('f')
                            .long("force")
                            .help("Overwrite an existing config file")
                            .action(ArgAction::SetTrue),
                    ),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
        .get_matches();

    let config_path = commands::config_path(&matches)?;
    let loaded = Config::load_from(&config_path);

    let logging = match &loaded {
        Ok(config) => config.logging.clone(),
        Err(_) => LoggingConfig::default(),
    };
    if let Err(e) = lapmon::init_logging(&logging) {
        eprintln!("Warning: {}", e);
    }

    match matches.subcommand() {
        Some(("run", sub_matches)) => {
            commands::run::execute(sub_matches, loaded?, &config_path)?;
        }
        Some(("status", sub_matches)) => {
            commands::status::execute(sub_matches, &loaded?)?;
        }
        Some(("check", sub_matches)) => {
            commands::check::execute(sub_matches, &loaded?)?;
        }
        Some(("config", sub_matches)) => {
            commands::config::execute(sub_matches, &config_path, loaded)?;
        }
        Some(("version", _)) => {
            commands::version()?;
        }
        _ => {
            println!("Welcome to lapmon!");
            println!("Use 'lapmon --help' for more information.");
        }
    }

    Ok(())
}
