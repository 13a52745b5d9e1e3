//! Run command handler.
//!
//! Runs the monitoring loop in the background and reads control commands from
//! stdin until the user quits or presses Ctrl+C.

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;

use crate::core::system_monitor::{
    CollectorConfig, ConsoleNotifier, LogNotifier, MetricsCollector, MonitorRuntime,
    NotificationSink,
};
use crate::core::Config;
use crate::ui;

/// Interactive control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Status,
    Pause,
    Resume,
    Reload,
    Help,
    Quit,
}

impl ControlCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "s" | "status" => Some(ControlCommand::Status),
            "p" | "pause" => Some(ControlCommand::Pause),
            "r" | "resume" => Some(ControlCommand::Resume),
            "reload" => Some(ControlCommand::Reload),
            "h" | "help" | "?" => Some(ControlCommand::Help),
            "q" | "quit" | "exit" => Some(ControlCommand::Quit),
            _ => None,
        }
    }
}

/// Execute the run command
pub fn execute(matches: &ArgMatches, mut config: Config, config_path: &Path) -> Result<()> {
    if let Some(&interval) = matches.get_one::<u64>("interval") {
        config.monitoring_interval = interval;
    }
    config.validate().context("Invalid monitoring configuration")?;

    let sink: Arc<dyn NotificationSink> = if matches.get_flag("quiet") {
        Arc::new(LogNotifier)
    } else {
        Arc::new(ConsoleNotifier::new())
    };

    let collector = MetricsCollector::with_config(CollectorConfig::from_config(&config));
    let runtime = MonitorRuntime::start(&config, Box::new(collector), sink)
        .context("Failed to start monitoring")?;

    let (tx, rx) = mpsc::channel::<ControlCommand>();

    let ctrlc_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(ControlCommand::Quit);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    std::thread::Builder::new()
        .name("lapmon-stdin".to_string())
        .spawn(move || read_commands(tx))
        .context("Failed to start input thread")?;

    println!("{}", "Monitoring system resources...".cyan().bold());
    println!(
        "{}",
        format!(
            "Checking every {}s. Type 'h' for commands, Ctrl+C to quit.",
            config.monitoring_interval
        )
        .dimmed()
    );

    for command in rx {
        match command {
            ControlCommand::Status => {
                if let Err(e) = runtime.show_current() {
                    ui::error(&format!("Could not collect metrics: {}", e));
                }
            }
            ControlCommand::Pause => {
                if runtime.pause() {
                    ui::warn("Monitoring paused");
                } else {
                    ui::dimmed("Monitoring is already paused");
                }
            }
            ControlCommand::Resume => {
                if runtime.resume() {
                    ui::success("Monitoring resumed");
                } else {
                    ui::dimmed("Monitoring is not paused");
                }
            }
            ControlCommand::Reload => reload(&runtime, &config, config_path),
            ControlCommand::Help => print_help(),
            ControlCommand::Quit => break,
        }
    }

    ui::info("Quitting...");
    runtime.shutdown();

    Ok(())
}

fn read_commands(tx: mpsc::Sender<ControlCommand>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        match ControlCommand::parse(&line) {
            Some(command) => {
                if tx.send(command).is_err() {
                    break;
                }
            }
            None => ui::dimmed(&format!("Unknown command '{}', type 'h' for help", line.trim())),
        }
    }
    // stdin closed: keep monitoring until Ctrl+C
    log::debug!("Stopped reading commands from stdin");
}

fn reload(runtime: &MonitorRuntime, current: &Config, config_path: &Path) {
    match Config::load_from(config_path) {
        Ok(mut config) => {
            // The timer keeps its period until restart
            if config.monitoring_interval != current.monitoring_interval {
                ui::warn("monitoring_interval changes take effect after a restart");
                config.monitoring_interval = current.monitoring_interval;
            }
            runtime.reload_config(config);
            ui::success("Configuration reloaded");
        }
        Err(e) => ui::error(&format!("Reload failed, keeping current config: {:#}", e)),
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  s, status   Show current metrics");
    println!("  p, pause    Pause monitoring");
    println!("  r, resume   Resume monitoring");
    println!("  reload      Reload the configuration file");
    println!("  q, quit     Quit");
}
