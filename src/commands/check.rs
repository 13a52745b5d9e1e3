use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;

use crate::core::system_monitor::{
    evaluate_alerts, is_quiet_hours, CollectorConfig, EngineState, MetricSource, MetricsCollector,
};
use crate::core::Config;
use crate::ui::format_alert;

/// Collect one snapshot and report which alerts a fresh engine would raise
pub fn execute(matches: &ArgMatches, config: &Config) -> Result<()> {
    let mut config = config.clone();
    let now = chrono::Local::now();

    if matches.get_flag("ignore-quiet-hours") {
        // An unparsable window disables the quiet-hours gate
        config.cooldown.quiet_hours_start.clear();
        config.cooldown.quiet_hours_end.clear();
    } else if is_quiet_hours(&config.cooldown, &now) && !matches.get_flag("json") {
        println!(
            "{}",
            format!(
                "Inside quiet hours ({} - {}), alerts are suppressed. Use --ignore-quiet-hours to check anyway.",
                config.cooldown.quiet_hours_start, config.cooldown.quiet_hours_end
            )
            .yellow()
        );
    }

    let mut collector = MetricsCollector::with_config(CollectorConfig::from_config(&config));
    let snapshot = collector
        .collect()
        .context("Failed to collect system metrics")?;

    let mut state = EngineState::new();
    let alerts = evaluate_alerts(&config, &mut state, &snapshot, now);

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
        return Ok(());
    }

    if alerts.is_empty() {
        println!("{}", "No thresholds breached".green().bold());
        if state.cpu_breach_start.is_some() && config.cpu.duration_seconds > 0 {
            println!(
                "{}",
                format!(
                    "CPU is above {:.1}% but has to stay there for {}s before alerting",
                    config.cpu.threshold_percent, config.cpu.duration_seconds
                )
                .dimmed()
            );
        }
    }

    for alert in &alerts {
        println!("{}", format_alert(alert));
    }

    Ok(())
}
